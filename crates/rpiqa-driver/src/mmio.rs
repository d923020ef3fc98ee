//! Memory-mapped I/O over the physical memory device
//!
//! The receiver registers live in the Zynq's AXI GP0/GP1 address space and are
//! reached by mapping `/dev/mem` at their physical address. The device is
//! opened with `O_SYNC`, which makes the kernel map the range uncached; every
//! access below is volatile and uses the register's exact width.

// MMIO registers are naturally aligned by hardware, so pointer casts are safe
#![allow(clippy::cast_ptr_alignment)]

use crate::error::{RpiqaError, Result};
use rustix::fs::OFlags;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Which of a channel's three windows a region covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Configuration registers
    Config,
    /// Status registers
    Status,
    /// FIFO data
    Fifo,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Status => write!(f, "status"),
            Self::Fifo => write!(f, "fifo"),
        }
    }
}

/// Open handle on the physical memory device
#[derive(Debug)]
pub struct MemoryDevice {
    file: File,
    path: PathBuf,
}

impl MemoryDevice {
    /// Open the device read/write, uncached
    ///
    /// # Errors
    ///
    /// Returns [`RpiqaError::MemoryDevice`] if the device cannot be opened
    /// (usually missing root privileges).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // SAFETY: OFlags::SYNC.bits() is always a valid i32 value (flag bits are small positive values)
        #[allow(clippy::cast_possible_wrap)]
        let sync_flag = OFlags::SYNC.bits() as i32;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(sync_flag)
            .open(path)
            .map_err(|e| RpiqaError::memory_device(path, e))?;

        tracing::debug!("Opened memory device {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Device path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map `len` bytes starting at physical address `phys`
    ///
    /// # Errors
    ///
    /// Returns an error if `phys` is not page aligned or the kernel refuses
    /// the mapping.
    ///
    /// # Panics
    ///
    /// Panics if `rustix::mm::mmap` returns a null pointer on success
    /// (should never happen per rustix API contract).
    pub fn map(&self, window: Window, phys: u64, len: usize) -> Result<MmioRegion> {
        let page = rustix::param::page_size() as u64;
        if phys % page != 0 {
            return Err(RpiqaError::map_failed(
                window,
                phys,
                format!("not aligned to {page:#x}-byte page"),
            ));
        }
        if len == 0 {
            return Err(RpiqaError::map_failed(window, phys, "zero-length window"));
        }

        // SAFETY: mmap necessary for MMIO - maps a physical window into the process.
        // Invariants: (1) fd valid for the lifetime of self; (2) phys page aligned
        // (checked above); (3) len non-zero; (4) MAP_SHARED so stores reach the
        // device; (5) rustix returns Err instead of MAP_FAILED.
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                self.file.as_fd(),
                phys,
            )
            .map_err(|e| RpiqaError::map_failed(window, phys, format!("mmap failed: {e}")))?;

            NonNull::new(addr.cast::<u8>())
                .expect("rustix mmap returns non-null pointer on success")
        };

        tracing::info!("Mapped {window} window {phys:#x} at {ptr:p}, size={len:#x}");

        Ok(MmioRegion {
            ptr,
            size: len,
            phys,
            window,
        })
    }
}

/// One mapped register window
pub struct MmioRegion {
    ptr: NonNull<u8>,
    size: usize,
    phys: u64,
    window: Window,
}

impl fmt::Debug for MmioRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmioRegion")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &self.size)
            .field("phys", &format_args!("{:#x}", self.phys))
            .field("window", &self.window)
            .finish()
    }
}

// SAFETY: Send - MmioRegion owns the mapping exclusively. Moving between threads
// doesn't invalidate it (mmap'd memory is process-wide). No thread-local state.
unsafe impl Send for MmioRegion {}

impl MmioRegion {
    fn check(&self, offset: usize, width: usize) {
        assert!(
            offset + width <= self.size,
            "{} register offset {offset:#x}+{width} out of bounds",
            self.window
        );
        assert_eq!(offset % width, 0, "unaligned {width}-byte register access");
    }

    /// Read an 8-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the mapped region.
    pub fn read_u8(&self, offset: usize) -> u8 {
        self.check(offset, 1);
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) ptr from mmap, valid for self.size; (2) offset in bounds.
        unsafe { self.ptr.as_ptr().add(offset).read_volatile() }
    }

    /// Write an 8-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the mapped region.
    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.check(offset, 1);
        tracing::trace!("{} write u8 @ {offset:#x} = {value:#x}", self.window);
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants: (1) ptr from mmap; (2) offset in bounds.
        unsafe { self.ptr.as_ptr().add(offset).write_volatile(value) }
    }

    /// Read a 16-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 2` exceeds the region or is not 2-byte aligned.
    pub fn read_u16(&self, offset: usize) -> u16 {
        self.check(offset, 2);
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) ptr from mmap; (2) offset+2 <= size; (3) u16 aligned (checked).
        unsafe { self.ptr.as_ptr().add(offset).cast::<u16>().read_volatile() }
    }

    /// Write a 16-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 2` exceeds the region or is not 2-byte aligned.
    pub fn write_u16(&mut self, offset: usize, value: u16) {
        self.check(offset, 2);
        tracing::trace!("{} write u16 @ {offset:#x} = {value:#x}", self.window);
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants: (1) ptr from mmap; (2) offset+2 <= size; (3) u16 aligned (checked).
        unsafe {
            self.ptr
                .as_ptr()
                .add(offset)
                .cast::<u16>()
                .write_volatile(value);
        }
    }

    /// Read a 32-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the region or is not 4-byte aligned.
    pub fn read_u32(&self, offset: usize) -> u32 {
        self.check(offset, 4);
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) ptr from mmap; (2) offset+4 <= size; (3) u32 aligned (checked).
        unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() }
    }

    /// Write a 32-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the region or is not 4-byte aligned.
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.check(offset, 4);
        tracing::trace!("{} write u32 @ {offset:#x} = {value:#x}", self.window);
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants: (1) ptr from mmap; (2) offset+4 <= size; (3) u32 aligned (checked).
        unsafe {
            self.ptr
                .as_ptr()
                .add(offset)
                .cast::<u32>()
                .write_volatile(value);
        }
    }

    /// Copy consecutive 64-bit words out of the region
    ///
    /// Each word is a separate volatile load, so the FIFO sees exactly
    /// `dst.len()` 8-byte reads.
    ///
    /// # Panics
    ///
    /// Panics if the words do not fit in the region.
    pub fn read_u64_into(&self, offset: usize, dst: &mut [u64]) {
        self.check(offset, 8);
        assert!(
            offset + dst.len() * 8 <= self.size,
            "{} read of {} words at {offset:#x} out of bounds",
            self.window,
            dst.len()
        );
        let base = self.ptr.as_ptr().cast::<u64>();
        for (i, word) in dst.iter_mut().enumerate() {
            // SAFETY: read_volatile necessary for MMIO - every load pops FIFO data.
            // Invariants: (1) ptr from mmap; (2) offset+len*8 <= size (checked);
            // (3) u64 aligned (checked).
            *word = unsafe { base.add(offset / 8 + i).read_volatile() };
        }
    }

    /// Window kind
    pub const fn window(&self) -> Window {
        self.window
    }

    /// Physical base address
    pub const fn phys(&self) -> u64 {
        self.phys
    }

    /// Region size in bytes
    pub const fn size(&self) -> usize {
        self.size
    }
}

impl Drop for MmioRegion {
    fn drop(&mut self) {
        // SAFETY: munmap necessary - releases the window mapped in MemoryDevice::map.
        // Invariants: (1) ptr+size are exactly what mmap returned; (2) Drop runs at
        // most once; (3) no outstanding references (accessors borrow self).
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap of {} window failed: {e}", self.window);
            }
        }
        tracing::debug!("Unmapped {} window {:#x}", self.window, self.phys);
    }
}
