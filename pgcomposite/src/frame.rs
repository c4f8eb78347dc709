//! The [`FrameReader`] trait.
//!
//! A frame reader is the byte source a decoder pulls from. The only
//! suspension point is [`FrameReader::poll_ensure`], every `read_*` call
//! must be preceded by a successful ensure covering its width.
use bytes::{Buf, Bytes};
use std::{
    io,
    marker::PhantomPinned,
    pin::Pin,
    task::{Context, Poll},
};

/// A buffered source of binary values.
pub trait FrameReader {
    /// Poll until at least `n` bytes are buffered.
    ///
    /// Returns [`io::ErrorKind::UnexpectedEof`] if the source ends before that.
    fn poll_ensure(&mut self, cx: &mut Context, n: usize) -> Poll<io::Result<()>>;

    /// Number of bytes that can be read without suspending.
    fn remaining(&self) -> usize;

    /// Read big endian `i32`.
    ///
    /// # Panics
    ///
    /// Panics if less than 4 bytes are buffered.
    fn read_i32(&mut self) -> i32;

    /// Read big endian `u32`.
    ///
    /// # Panics
    ///
    /// Panics if less than 4 bytes are buffered.
    fn read_u32(&mut self) -> u32;

    /// Split off the next `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if less than `n` bytes are buffered.
    fn read_bytes(&mut self, n: usize) -> Bytes;
}

impl<R> FrameReader for &mut R where R: FrameReader + ?Sized {
    fn poll_ensure(&mut self, cx: &mut Context, n: usize) -> Poll<io::Result<()>> {
        R::poll_ensure(self, cx, n)
    }

    fn remaining(&self) -> usize {
        R::remaining(self)
    }

    fn read_i32(&mut self) -> i32 {
        R::read_i32(self)
    }

    fn read_u32(&mut self) -> u32 {
        R::read_u32(self)
    }

    fn read_bytes(&mut self, n: usize) -> Bytes {
        R::read_bytes(self, n)
    }
}

/// Already received value, ensure never suspends.
impl FrameReader for Bytes {
    fn poll_ensure(&mut self, _: &mut Context, n: usize) -> Poll<io::Result<()>> {
        match self.len() >= n {
            true => Poll::Ready(Ok(())),
            false => Poll::Ready(Err(eof(n, self.len()))),
        }
    }

    fn remaining(&self) -> usize {
        self.len()
    }

    fn read_i32(&mut self) -> i32 {
        self.get_i32()
    }

    fn read_u32(&mut self) -> u32 {
        self.get_u32()
    }

    fn read_bytes(&mut self, n: usize) -> Bytes {
        self.split_to(n)
    }
}

fn eof(expect: usize, found: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("expected {expect} bytes, but only {found} remaining"),
    )
}

/// An extension trait to provide `Future` API for [`FrameReader`].
pub trait FrameReaderExt: FrameReader {
    /// Wait until at least `n` bytes are buffered.
    fn ensure(&mut self, n: usize) -> Ensure<'_, Self> {
        Ensure { reader: self, n, _pin: PhantomPinned }
    }
}

impl<T> FrameReaderExt for T where T: FrameReader + ?Sized { }

pin_project_lite::pin_project! {
    /// Future returned by [`FrameReaderExt::ensure`].
    #[derive(Debug)]
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Ensure<'a, R: ?Sized> {
        reader: &'a mut R,
        n: usize,
        #[pin]
        _pin: PhantomPinned,
    }
}

impl<R> Future for Ensure<'_, R>
where
    R: FrameReader + ?Sized,
{
    type Output = io::Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.project();
        me.reader.poll_ensure(cx, *me.n)
    }
}

#[cfg(feature = "tokio")]
pub use buffered::BufferedReader;

#[cfg(feature = "tokio")]
mod buffered {
    use bytes::{BufMut, Bytes, BytesMut};
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll, ready},
    };
    use tokio::io::AsyncRead;

    use super::{FrameReader, eof};

    const DEFAULT_BUF_CAPACITY: usize = 1024;

    /// [`FrameReader`] over an [`AsyncRead`].
    #[derive(Debug)]
    pub struct BufferedReader<R> {
        inner: R,
        buf: BytesMut,
    }

    impl<R> BufferedReader<R> {
        pub fn new(inner: R) -> Self {
            Self::with_capacity(DEFAULT_BUF_CAPACITY, inner)
        }

        pub fn with_capacity(capacity: usize, inner: R) -> Self {
            Self { inner, buf: BytesMut::with_capacity(capacity) }
        }

        /// Returns currently buffered bytes.
        pub fn buffer(&self) -> &[u8] {
            &self.buf
        }

        pub fn into_inner(self) -> R {
            self.inner
        }
    }

    impl<R> FrameReader for BufferedReader<R>
    where
        R: AsyncRead + Unpin,
    {
        fn poll_ensure(&mut self, cx: &mut Context, n: usize) -> Poll<io::Result<()>> {
            while self.buf.len() < n {
                self.buf.reserve(n - self.buf.len());

                let read = {
                    let dst = self.buf.chunk_mut();
                    let dst = unsafe { dst.as_uninit_slice_mut() };
                    let mut buf = tokio::io::ReadBuf::uninit(dst);
                    let ptr = buf.filled().as_ptr();
                    ready!(Pin::new(&mut self.inner).poll_read(cx, &mut buf)?);

                    // Ensure the pointer does not change from under us
                    assert_eq!(ptr, buf.filled().as_ptr());
                    buf.filled().len()
                };

                if read == 0 {
                    return Poll::Ready(Err(eof(n, self.buf.len())));
                }

                // Safety: This is guaranteed to be the number of initialized (and read)
                // bytes due to the invariants provided by `ReadBuf::filled`.
                unsafe {
                    self.buf.advance_mut(read);
                }
            }

            Poll::Ready(Ok(()))
        }

        fn remaining(&self) -> usize {
            self.buf.len()
        }

        fn read_i32(&mut self) -> i32 {
            bytes::Buf::get_i32(&mut self.buf)
        }

        fn read_u32(&mut self) -> u32 {
            bytes::Buf::get_u32(&mut self.buf)
        }

        fn read_bytes(&mut self, n: usize) -> Bytes {
            self.buf.split_to(n).freeze()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn bytes_ensure_reports_eof() {
        let mut bytes = Bytes::from_static(&[0, 0, 0, 7, 1]);
        bytes.ensure(4).await.unwrap();
        assert_eq!(bytes.read_i32(), 7);

        let err = bytes.ensure(4).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(FrameReader::remaining(&bytes), 1);
    }

    #[tokio::test]
    async fn buffered_waits_for_split_writes() {
        use tokio::io::AsyncWriteExt;

        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);

        let writer = async move {
            tx.write_all(&[0, 0]).await.unwrap();
            tokio::task::yield_now().await;
            tx.write_all(&[1, 0, b'a', b'b']).await.unwrap();
        };
        let read = async {
            reader.ensure(4).await.unwrap();
            let n = reader.read_i32();
            reader.ensure(2).await.unwrap();
            (n, reader.read_bytes(2))
        };

        let ((), (n, bytes)) = tokio::join!(writer, read);
        assert_eq!(n, 256);
        assert_eq!(&bytes[..], b"ab");
    }

    #[tokio::test]
    async fn buffered_eof() {
        let mut reader = BufferedReader::new(&[0u8, 1][..]);
        let err = reader.ensure(4).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(reader.buffer(), &[0, 1]);
    }
}
