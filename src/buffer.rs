//! Bounded storage for System Exclusive payloads.
//!
//! Exclusive transfers are the one variable-length message in the MIDI wire format, so they are
//! the one place where the decoder needs a buffer. The buffer is pluggable: the capacity of the
//! buffer decides the largest payload the [`Parser`](crate::Parser) will deliver, and any
//! transfer that outgrows it is dropped whole.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Describes types that can back System Exclusive payload accumulation for the
/// [`Parser`](crate::Parser) type.
///
/// This trait is automatically implemented by the [`stack_buffer!`](crate::stack_buffer) macro,
/// and very rarely should be implemented manually.
pub trait Buffer {
    /// Append a single byte, failing with `Err(())` if the buffer is out of room.
    fn push(&mut self, byte: u8) -> Result<(), ()>;
    fn clear(&mut self);
    fn as_slice(&self) -> &[u8];
}

/// A `Buffer` with virtually unlimited capacity.
///
/// Opting into a `Vec` buffer gives up the bounded-memory guarantee: a rogue endless exclusive
/// transfer will keep growing it.
#[cfg(feature = "alloc")]
impl Buffer for Vec<u8> {
    #[inline]
    fn push(&mut self, byte: u8) -> Result<(), ()> {
        Vec::push(self, byte);
        Ok(())
    }
    #[inline]
    fn clear(&mut self) {
        Vec::clear(self)
    }
    #[inline]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Define a fixed-capacity stack buffer type, suitable for use with
/// [`Parser::with_buffer`](crate::Parser::with_buffer).
///
/// # Usage
///
/// The `stack_buffer!` macro defines a buffer type, which can later be instantiated for use with
/// a `Parser`.
///
/// ```rust
/// midiwire::stack_buffer! {
///     struct MyBuffer([u8; 1024]);
/// }
///
/// let parser = midiwire::Parser::with_buffer(MyBuffer::new());
/// ```
///
/// Buffers can have attributes, documentation, and be made `pub`lic.
///
/// ```rust
/// midiwire::stack_buffer! {
///     /// A very small buffer.
///     #[repr(C)]
///     pub struct MyBuffer([u8; 16]);
/// }
///
/// let parser = midiwire::Parser::<MyBuffer>::default();
/// ```
#[macro_export]
macro_rules! stack_buffer {
    {
        @impl_def {$($attr:meta)*} {$($pub:ident)?} {$name:ident} {$size:expr}
    } => {
        $(#[$attr])*
        #[derive(Clone)]
        $($pub)? struct $name {
            buf: [u8; $size],
            len: usize,
        }
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "["))?;
                for databyte in self.buf[..self.len].iter() {
                    write!(f, "{:02x}", databyte)?;
                }
                write!(f, "]")?;
                Ok(())
            }
        }
        impl $name {
            pub const MAX_CAP: usize = $size;
            #[inline]
            $($pub)? const fn new() -> $name {
                $name {
                    buf: [0; $size],
                    len: 0,
                }
            }
        }
        impl core::default::Default for $name {
            #[inline]
            fn default() -> $name {
                Self::new()
            }
        }
        impl $crate::Buffer for $name {
            #[inline]
            fn push(&mut self, byte: u8) -> core::result::Result<(), ()> {
                if self.len >= Self::MAX_CAP {
                    Err(())
                } else {
                    self.buf[self.len] = byte;
                    self.len += 1;
                    Ok(())
                }
            }
            #[inline]
            fn clear(&mut self) {
                self.len = 0;
            }
            #[inline]
            fn as_slice(&self) -> &[u8] {
                &self.buf[..self.len]
            }
        }
    };
    {
        $(#[$attr:meta])*
        struct $name:ident([u8; $size:expr]);
    }=> {
        $crate::stack_buffer!(@impl_def {$($attr)*} {} {$name} {$size});
    };
    {
        $(#[$attr:meta])*
        pub struct $name:ident([u8; $size:expr]);
    }=> {
        $crate::stack_buffer!(@impl_def {$($attr)*} {pub} {$name} {$size});
    };
}

stack_buffer! {
    /// The default System Exclusive buffer for [`Parser`](crate::Parser): 128 bytes on the
    /// stack.
    ///
    /// 128 bytes covers the exclusive messages of typical controller hardware while staying
    /// cheap enough to embed in an interrupt-driven firmware. Transfers larger than the buffer
    /// are dropped whole, so if larger dumps are expected, define a bigger buffer with
    /// [`stack_buffer!`](crate::stack_buffer) or (with the `alloc` feature) use a plain
    /// `Vec<u8>`.
    pub struct DefaultBuffer([u8; 128]);
}
