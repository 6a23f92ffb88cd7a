//! Positioned byte access to the located backing device
//!
//! Two independent handles are kept so unprivileged callers can still read
//! while write access needs elevated rights. Each handle is an explicit
//! acquire-once value: absent until first use, then reused for the process
//! lifetime. Every transfer is a single positioned syscall; a short transfer
//! is an error, never retried or merged.

use std::{
    fs::{File, OpenOptions},
    os::unix::fs::FileExt,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;

use crate::error::{MailboxError, Result};

pub(crate) struct MailboxDevice {
    path: PathBuf,
    rdonly: OnceCell<File>,
    wronly: OnceCell<File>,
}

impl MailboxDevice {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rdonly: OnceCell::new(),
            wronly: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<&File> {
        self.rdonly.get_or_try_init(|| {
            File::open(&self.path).map_err(|e| MailboxError::open_failed(&self.path, e))
        })
    }

    fn writer(&self) -> Result<&File> {
        self.wronly.get_or_try_init(|| {
            OpenOptions::new()
                .write(true)
                .open(&self.path)
                .map_err(|e| MailboxError::open_failed(&self.path, e))
        })
    }

    /// Single positioned read of exactly `len` bytes
    pub fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        let file = self.reader()?;
        let mut buf = vec![0u8; len];
        match file.read_at(&mut buf, offset as u64) {
            Ok(n) if n == len => Ok(buf),
            Ok(n) => Err(MailboxError::PartialRead {
                offset,
                requested: len,
                transferred: n,
                source: None,
            }),
            Err(e) => Err(MailboxError::PartialRead {
                offset,
                requested: len,
                transferred: 0,
                source: Some(e),
            }),
        }
    }

    /// Single positioned write of exactly `bytes.len()` bytes
    pub fn write_at(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        let file = self.writer()?;
        match file.write_at(bytes, offset as u64) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => Err(MailboxError::PartialWrite {
                offset,
                requested: bytes.len(),
                transferred: n,
                source: None,
            }),
            Err(e) => Err(MailboxError::PartialWrite {
                offset,
                requested: bytes.len(),
                transferred: 0,
                source: Some(e),
            }),
        }
    }
}
