use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

use super::platform::ProcessHost;

const BUNDLE_SUFFIX: &str = ".app";
const BUNDLE_ID_KEY: &str = "<key>CFBundleIdentifier</key>";
const BINARY_PLIST_MAGIC: &[u8] = b"bplist00";

/// Identity of a live process, resolved from its executable path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessDescriptor {
    pub pid: u32,
    pub path: PathBuf,
    pub name: String,
    pub bundle_identifier: Option<String>,
}

/// Resolve `pid` to a descriptor.
///
/// `None` means the process vanished between enumeration and resolution; the
/// caller drops it from the cycle.
pub fn resolve<H: ProcessHost + ?Sized>(host: &H, pid: u32) -> Option<ProcessDescriptor> {
    let path = host.executable_path(pid)?;
    let name = display_name(&path);
    let bundle_identifier = bundle_root(&path).and_then(|root| host.bundle_identifier(&root));
    Some(ProcessDescriptor {
        pid,
        path,
        name,
        bundle_identifier,
    })
}

/// Last path component, or the whole path when it has none.
pub fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Path truncated after the outermost `*.app` segment.
///
/// `/Applications/Safari.app/Contents/MacOS/Safari` → `/Applications/Safari.app`.
pub fn bundle_root(path: &Path) -> Option<PathBuf> {
    let mut root = PathBuf::new();
    for component in path.components() {
        root.push(component.as_os_str());
        if let Component::Normal(segment) = component
            && segment.to_string_lossy().ends_with(BUNDLE_SUFFIX)
            && segment.len() > BUNDLE_SUFFIX.len()
        {
            return Some(root);
        }
    }
    None
}

/// `CFBundleIdentifier` from `<root>/Contents/Info.plist`.
///
/// A missing or unreadable manifest yields `None`. Only XML plists are read;
/// a binary (`bplist00`) manifest also yields `None`.
pub fn read_bundle_identifier(bundle_root: &Path) -> Option<String> {
    let manifest = bundle_root.join("Contents").join("Info.plist");
    let bytes = fs::read(&manifest).ok()?;
    if bytes.starts_with(BINARY_PLIST_MAGIC) {
        trace!(path = %manifest.display(), "binary plist manifest skipped");
        return None;
    }
    let content = String::from_utf8(bytes).ok()?;
    parse_bundle_identifier(&content)
}

pub(crate) fn parse_bundle_identifier(plist: &str) -> Option<String> {
    let after = &plist[plist.find(BUNDLE_ID_KEY)? + BUNDLE_ID_KEY.len()..];
    let value_start = after.find("<string>")? + "<string>".len();
    // the value must be the very next element after the key
    if !after[..value_start - "<string>".len()].trim().is_empty() {
        return None;
    }
    let value_end = after[value_start..].find("</string>")?;
    let value = after[value_start..value_start + value_end].trim();
    (!value.is_empty()).then(|| value.to_string())
}
