//! Ownership descriptor and repair policy

use serde::Deserialize;

use crate::permissions::mode::ModeSpec;

/// Owner, group and mode applied recursively to a repaired path.
///
/// `None` for `uid` or `gid` leaves that half of the ownership untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipDescriptor {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub mode: ModeSpec,
}

impl OwnershipDescriptor {
    pub fn has_ownership(&self) -> bool {
        self.uid.is_some() || self.gid.is_some()
    }

    /// Owner argument in the form `chown` expects: `uid:gid`, `uid` or `:gid`
    pub fn chown_arg(&self) -> Option<String> {
        match (self.uid, self.gid) {
            (Some(uid), Some(gid)) => Some(format!("{}:{}", uid, gid)),
            (Some(uid), None) => Some(uid.to_string()),
            (None, Some(gid)) => Some(format!(":{}", gid)),
            (None, None) => None,
        }
    }
}

/// What to do when every strategy for a concern has failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    /// Log the failure and keep bootstrapping
    #[default]
    BestEffort,
    /// Abort the bootstrap
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chown_arg_forms() {
        let mut d = OwnershipDescriptor {
            uid: Some(1001),
            gid: Some(0),
            mode: ModeSpec::default(),
        };
        assert_eq!(d.chown_arg().as_deref(), Some("1001:0"));
        d.gid = None;
        assert_eq!(d.chown_arg().as_deref(), Some("1001"));
        d.uid = None;
        d.gid = Some(0);
        assert_eq!(d.chown_arg().as_deref(), Some(":0"));
        d.gid = None;
        assert!(d.chown_arg().is_none());
        assert!(!d.has_ownership());
    }
}
