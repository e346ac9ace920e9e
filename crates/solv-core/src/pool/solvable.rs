use super::reldep::Dep;
use super::{ArchId, NameId, RepoId, VendorId};

/// Stable identifier for a solvable: its index into the pool's solvable array.
pub type PackageId = u32;

/// Reserved id meaning "no solvable" / NULL.
pub const ID_NULL: PackageId = 0;
/// A distinguished solvable anchoring the installed system, used as the
/// target of namespace predicates that are unconditionally true and as the
/// always-present root of the "installed" repo.
pub const SYSTEM_SOLVABLE: PackageId = 1;

/// A package record: name, evr, arch, vendor, repo-owner, and its dependency
/// relation lists.
#[derive(Debug, Clone)]
pub struct Solvable {
    pub id: PackageId,
    pub name: NameId,
    /// Epoch:version-release string. Compared through the EVR primitive
    /// (`solv_semver::Comparator`), never parsed here.
    pub evr: String,
    pub arch: ArchId,
    pub vendor: Option<VendorId>,
    pub repo: Option<RepoId>,
    pub provides: Vec<Dep>,
    pub requires: Vec<Dep>,
    pub conflicts: Vec<Dep>,
    pub obsoletes: Vec<Dep>,
    pub recommends: Vec<Dep>,
    pub suggests: Vec<Dep>,
    pub supplements: Vec<Dep>,
    pub enhances: Vec<Dep>,
    /// File paths this solvable owns, consulted by `add_file_provides` to
    /// answer requires of the form `/usr/bin/foo`.
    pub files: Vec<String>,
    /// True if this name is on the multiversion set (multiple installed
    /// solvables of this name may coexist).
    pub multiversion: bool,
    /// True if a job marked this installed solvable `USERINSTALLED` - pinned
    /// against cleandeps removal.
    pub userinstalled: bool,
}

impl Solvable {
    pub fn new(id: PackageId, name: NameId, evr: impl Into<String>, arch: ArchId) -> Self {
        Self {
            id,
            name,
            evr: evr.into(),
            arch,
            vendor: None,
            repo: None,
            provides: Vec::new(),
            requires: Vec::new(),
            conflicts: Vec::new(),
            obsoletes: Vec::new(),
            recommends: Vec::new(),
            suggests: Vec::new(),
            supplements: Vec::new(),
            enhances: Vec::new(),
            files: Vec::new(),
            multiversion: false,
            userinstalled: false,
        }
    }
}
