use crate::app::error::{Result, TrackerError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// File inside a feature directory naming the group it belongs to.
pub const GROUP_FILE: &str = "group";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub name: String,
    pub directory: String,
}

/// Maps a feature directory to the logical group it reports under.
pub trait FeatureGrouper {
    fn feature_group(&self, directory: &str) -> Result<GroupDescriptor>;
}

/// Reads the group from the directory's `group` file, falling back to the
/// directory name.
#[derive(Debug, Default)]
pub struct DirectoryGrouper;

impl FeatureGrouper for DirectoryGrouper {
    fn feature_group(&self, directory: &str) -> Result<GroupDescriptor> {
        let group_error = |reason: String| TrackerError::Group {
            directory: directory.to_owned(),
            reason,
        };
        let path = Path::new(directory);
        let declared = match fs::read_to_string(path.join(GROUP_FILE)) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_owned),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(group_error(e.to_string())),
        };
        let name = match declared {
            Some(name) => name,
            None => path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .ok_or_else(|| group_error("directory has no name".to_owned()))?,
        };
        Ok(GroupDescriptor {
            name,
            directory: directory.to_owned(),
        })
    }
}
