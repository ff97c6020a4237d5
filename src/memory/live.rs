//! Probed access to the inspecting process's own address space
//!
//! [`LiveMemory`] never dereferences a raw address itself. On Linux every
//! copy is performed by `process_vm_readv(2)` against our own pid: the kernel
//! walks the page tables and reports `EFAULT` for unmapped or protected
//! ranges, so a dangling pointer costs one failed syscall instead of a
//! SIGSEGV. Other Unix systems get the same guarantee from `write(2)` into a
//! pipe, which also fails with `EFAULT` rather than faulting. Platforms with
//! neither reject every access.

use super::access::{is_plausible_range, MemoryAccess};
use super::value::Address;

/// Upper bound on a single probe copy
#[cfg(target_os = "linux")]
const PROBE_CHUNK: usize = 4096;

/// Accessor for memory of the current process
pub struct LiveMemory {
    #[cfg(all(unix, not(target_os = "linux")))]
    pipe: std::sync::Mutex<Option<[libc::c_int; 2]>>,
    page_size: usize,
}

impl LiveMemory {
    pub fn new() -> Self {
        LiveMemory {
            #[cfg(all(unix, not(target_os = "linux")))]
            pipe: std::sync::Mutex::new(open_pipe()),
            page_size: page_size(),
        }
    }

    /// Copy through the kernel; `false` on any error
    #[cfg(target_os = "linux")]
    fn copy(&self, address: Address, buf: &mut [u8]) -> bool {
        let mut done = 0;
        while done < buf.len() {
            let len = (buf.len() - done).min(PROBE_CHUNK);
            let local = libc::iovec {
                iov_base: buf[done..].as_mut_ptr().cast(),
                iov_len: len,
            };
            let remote = libc::iovec {
                iov_base: (address as usize + done) as *mut libc::c_void,
                iov_len: len,
            };
            // SAFETY: `local` points into `buf`, which is valid for `len`
            // bytes. The remote range is validated by the kernel, which
            // returns an error instead of faulting.
            let copied = unsafe {
                libc::process_vm_readv(libc::getpid(), &local, 1, &remote, 1, 0)
            };
            if copied != len as isize {
                tracing::trace!(address = address + done as u64, len, "probe rejected");
                return false;
            }
            done += len;
        }
        true
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    fn copy(&self, address: Address, buf: &mut [u8]) -> bool {
        // Chunks below PIPE_BUF are written atomically
        const PIPE_CHUNK: usize = 512;

        let Ok(guard) = self.pipe.lock() else {
            return false;
        };
        let Some([read_fd, write_fd]) = *guard else {
            return false;
        };
        let mut done = 0;
        while done < buf.len() {
            let len = (buf.len() - done).min(PIPE_CHUNK);
            let src = (address as usize + done) as *const libc::c_void;
            // SAFETY: the kernel validates `src` and fails with EFAULT when
            // it is not readable; nothing is dereferenced in user space.
            let written = unsafe { libc::write(write_fd, src, len) };
            if written != len as isize {
                tracing::trace!(address = address + done as u64, len, written, "probe rejected");
                // A partial write leaves bytes from the readable prefix queued
                drain_pipe(read_fd);
                return false;
            }
            // SAFETY: `buf[done..]` is valid for `len` bytes and the pipe
            // holds exactly the `len` bytes just written.
            let read = unsafe { libc::read(read_fd, buf[done..].as_mut_ptr().cast(), len) };
            if read != len as isize {
                drain_pipe(read_fd);
                return false;
            }
            done += len;
        }
        true
    }

    #[cfg(not(unix))]
    fn copy(&self, _address: Address, _buf: &mut [u8]) -> bool {
        false
    }
}

impl Default for LiveMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccess for LiveMemory {
    fn can_read(&self, address: Address, len: usize) -> bool {
        if !is_plausible_range(address, len) {
            return false;
        }
        if len == 0 {
            return true;
        }
        // One byte per touched page is enough: protection is per page
        let page = self.page_size as u64;
        let last = address + len as u64 - 1;
        let mut probe = address;
        let mut byte = [0u8; 1];
        loop {
            if !self.copy(probe, &mut byte) {
                return false;
            }
            let next_page = (probe / page + 1) * page;
            if next_page > last {
                break;
            }
            probe = next_page;
        }
        if probe != last {
            return self.copy(last, &mut byte);
        }
        true
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> bool {
        is_plausible_range(address, buf.len()) && self.copy(address, buf)
    }
}

#[cfg(unix)]
fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
}

#[cfg(not(unix))]
fn page_size() -> usize {
    4096
}

#[cfg(all(unix, not(target_os = "linux")))]
fn open_pipe() -> Option<[libc::c_int; 2]> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: `fds` is a valid two-element array
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        tracing::warn!("could not open probe pipe; live memory reads disabled");
        return None;
    }
    // The read end never blocks so leftovers can be drained
    // SAFETY: `fds[0]` was just opened by `pipe`
    let nonblocking = unsafe {
        let flags = libc::fcntl(fds[0], libc::F_GETFL);
        flags >= 0 && libc::fcntl(fds[0], libc::F_SETFL, flags | libc::O_NONBLOCK) == 0
    };
    if !nonblocking {
        tracing::warn!("could not configure probe pipe; live memory reads disabled");
        // SAFETY: both descriptors were opened above
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
        return None;
    }
    Some(fds)
}

/// Discard whatever a failed probe left in the pipe
#[cfg(all(unix, not(target_os = "linux")))]
fn drain_pipe(read_fd: libc::c_int) {
    let mut scratch = [0u8; 512];
    loop {
        // SAFETY: `scratch` is valid for its full length
        let n = unsafe { libc::read(read_fd, scratch.as_mut_ptr().cast(), scratch.len()) };
        if n <= 0 {
            break;
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
impl Drop for LiveMemory {
    fn drop(&mut self) {
        if let Ok(guard) = self.pipe.lock() {
            if let Some([read_fd, write_fd]) = *guard {
                // SAFETY: both descriptors were opened by `open_pipe`
                unsafe {
                    libc::close(read_fd);
                    libc::close(write_fd);
                }
            }
        }
    }
}
