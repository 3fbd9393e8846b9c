//! Selection of recording groups that need reorganizing.

use crate::scanner::{RecordingGroup, ScanResult};

/// Groups that will be reorganized, plus counts for reporting.
#[derive(Debug, Default)]
pub struct OrganizePlan {
    /// Qualifying groups in discovery order.
    pub groups: Vec<RecordingGroup>,
    /// Files across the qualifying groups; one progress unit each.
    pub total_files: usize,
    /// Camera files seen by the scan, qualifying or not.
    pub camera_files: usize,
}

impl OrganizePlan {
    /// Keeps only groups holding more than one MP4 segment.
    pub fn from_scan(scan: ScanResult) -> Self {
        let camera_files = scan.file_count();
        let groups: Vec<_> = scan
            .into_groups()
            .into_iter()
            .filter(RecordingGroup::qualifies)
            .collect();
        let total_files = groups.iter().map(|group| group.files.len()).sum();

        Self {
            groups,
            total_files,
            camera_files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanFilter;
    use crate::scanner::Scanner;
    use std::fs;
    use tempfile::TempDir;

    fn plan_for(names: &[&str]) -> OrganizePlan {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in names {
            fs::write(temp_dir.path().join(name), b"data").expect("Failed to write file");
        }
        let filter = ScanFilter::default();
        OrganizePlan::from_scan(Scanner::new(temp_dir.path(), false, &filter).scan())
    }

    #[test]
    fn test_single_segment_with_sidecars_not_selected() {
        let plan = plan_for(&["GH010005.MP4", "GH010005.THM", "GH010005.LRV"]);
        assert!(plan.is_empty());
        assert_eq!(plan.total_files, 0);
        assert_eq!(plan.camera_files, 3);
    }

    #[test]
    fn test_multi_segment_group_counts_all_files() {
        let plan = plan_for(&[
            "GH010001.MP4",
            "GH010001.THM",
            "GH010001.LRV",
            "GH020001.MP4",
            "GH020001.LRV",
            "GOPR9999.MP4",
        ]);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].recording_id, "0001");
        assert_eq!(plan.total_files, 5);
        assert_eq!(plan.camera_files, 6);
    }

    #[test]
    fn test_sidecars_only_not_selected() {
        let plan = plan_for(&["GH010007.LRV", "GH020007.LRV", "GH030007.THM"]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_no_camera_files() {
        let plan = plan_for(&["notes.txt", "IMG_0001.JPG"]);
        assert!(plan.is_empty());
        assert_eq!(plan.camera_files, 0);
    }
}
