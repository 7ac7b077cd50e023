use super::IdentityResolver;
use crate::error::IdentityError;
use crate::model::{Identity, MetadataRecord};
use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;
use std::ptr;

const FALLBACK_BUFFER_LEN: usize = 1024;
const MAX_BUFFER_LEN: usize = 1 << 20;

/// Resolves ids through the system user and group databases
/// (`getpwuid_r` / `getgrgid_r`), so NSS sources such as LDAP apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentityResolver;

impl IdentityResolver for SystemIdentityResolver {
    fn resolve(&self, record: &MetadataRecord) -> Result<Identity, IdentityError> {
        let (uid, gid) = match (record.identity.uid, record.identity.gid) {
            (Some(uid), Some(gid)) => (uid, gid),
            _ => return Err(IdentityError::MissingOwnership(record.path.clone())),
        };

        let group_name = lookup_group_name(gid)?;
        let username = lookup_username(uid)?;

        Ok(Identity {
            uid: Some(uid),
            gid: Some(gid),
            username,
            group_name,
        })
    }
}

fn initial_buffer_len(name: libc::c_int) -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let suggested = unsafe { libc::sysconf(name) };
    if suggested > 0 {
        suggested as usize
    } else {
        FALLBACK_BUFFER_LEN
    }
}

fn lookup_username(uid: u32) -> Result<String, IdentityError> {
    let mut buf: Vec<libc::c_char> = vec![0; initial_buffer_len(libc::_SC_GETPW_R_SIZE_MAX)];

    loop {
        let mut entry = MaybeUninit::<libc::passwd>::uninit();
        let mut result: *mut libc::passwd = ptr::null_mut();

        // SAFETY: every pointer refers to live storage owned by this frame and
        // `buf.len()` is the true capacity of `buf`.
        let rc = unsafe {
            libc::getpwuid_r(
                uid as libc::uid_t,
                entry.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < MAX_BUFFER_LEN {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
            continue;
        }
        if rc != 0 {
            return Err(IdentityError::Lookup {
                kind: "uid",
                id: uid,
                source: io::Error::from_raw_os_error(rc),
            });
        }
        if result.is_null() {
            return Err(IdentityError::UnknownUser(uid));
        }

        // SAFETY: a non-null result means `entry` was initialised and its
        // string fields point into `buf`, which is still alive.
        let name = unsafe { CStr::from_ptr((*result).pw_name) };
        return Ok(name.to_string_lossy().into_owned());
    }
}

fn lookup_group_name(gid: u32) -> Result<String, IdentityError> {
    let mut buf: Vec<libc::c_char> = vec![0; initial_buffer_len(libc::_SC_GETGR_R_SIZE_MAX)];

    loop {
        let mut entry = MaybeUninit::<libc::group>::uninit();
        let mut result: *mut libc::group = ptr::null_mut();

        // SAFETY: as in `lookup_username`.
        let rc = unsafe {
            libc::getgrgid_r(
                gid as libc::gid_t,
                entry.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < MAX_BUFFER_LEN {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
            continue;
        }
        if rc != 0 {
            return Err(IdentityError::Lookup {
                kind: "gid",
                id: gid,
                source: io::Error::from_raw_os_error(rc),
            });
        }
        if result.is_null() {
            return Err(IdentityError::UnknownGroup(gid));
        }

        // SAFETY: as in `lookup_username`.
        let name = unsafe { CStr::from_ptr((*result).gr_name) };
        return Ok(name.to_string_lossy().into_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_fills_ids_for_owned_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owned.txt");
        fs::write(&path, b"x").unwrap();
        let metadata = fs::symlink_metadata(&path).unwrap();
        let record = MetadataRecord::from_metadata(path, &metadata).unwrap();

        // SAFETY: getuid cannot fail.
        let uid = unsafe { libc::getuid() };
        assert_eq!(record.identity.uid, Some(uid));

        match SystemIdentityResolver.resolve(&record) {
            Ok(identity) => {
                assert_eq!(identity.uid, Some(uid));
                assert!(!identity.username.is_empty());
                assert!(!identity.group_name.is_empty());
            }
            // minimal containers may run under an id with no passwd entry
            Err(err) => assert!(matches!(
                err,
                IdentityError::UnknownUser(_)
                    | IdentityError::UnknownGroup(_)
                    | IdentityError::Lookup { .. }
            )),
        }
    }

    #[test]
    fn test_resolve_requires_ids() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = fs::symlink_metadata(dir.path()).unwrap();
        let mut record =
            MetadataRecord::from_metadata(dir.path().to_path_buf(), &metadata).unwrap();
        record.identity.uid = None;

        let err = SystemIdentityResolver.resolve(&record).unwrap_err();
        assert!(matches!(err, IdentityError::MissingOwnership(_)));
    }
}
