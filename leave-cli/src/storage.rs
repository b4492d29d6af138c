use anyhow::{Context, Result};
use leave_core::TeamData;
use std::path::Path;
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};
use tracing::debug;

/// Reads the team snapshot at `path`. A missing file is an empty team.
pub fn load_team(path: &Path) -> Result<TeamData> {
    if !path.exists() {
        debug!(path = %path.display(), "no team data yet, starting empty");
        return Ok(TeamData::new());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read team data at {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(TeamData::new());
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse team data at {}", path.display()))
}

/// Writes the snapshot as pretty JSON. Legacy leave arrays are saved in the day-map form.
pub fn save_team(path: &Path, data: &TeamData) -> Result<()> {
    let content = serde_json::to_string_pretty(data).context("Failed to serialize team data")?;
    secure_write(path, &content)
        .with_context(|| format!("Failed to write team data at {}", path.display()))?;
    debug!(path = %path.display(), members = data.members().len(), "saved team data");
    Ok(())
}

fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leave_core::LeaveType;

    #[test]
    fn missing_file_is_an_empty_team() {
        let dir = tempfile::tempdir().unwrap();
        let data = load_team(&dir.path().join("team.json")).unwrap();
        assert_eq!(data, TeamData::new());
    }

    #[test]
    fn save_then_load_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("team.json");

        let mut data = TeamData::with_members(["Alice", "Bob"]);
        data.leave_mut()
            .set_day("Alice", 2024, 3, 4, Some(LeaveType::Morning));
        data.set_birthday("Bob", "07-14").unwrap();

        save_team(&path, &data).unwrap();
        assert_eq!(load_team(&path).unwrap(), data);
    }

    #[test]
    fn legacy_file_is_normalised_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        std::fs::write(
            &path,
            r#"{"members":["Alice"],"leaveData":{"Alice":{"2024-03":[4,5]}}}"#,
        )
        .unwrap();

        let data = load_team(&path).unwrap();
        let march = data.leave().month_for("Alice", 2024, 3).unwrap();
        assert_eq!(march.get(4), Some(LeaveType::Full));
        assert_eq!(march.get(5), Some(LeaveType::Full));

        save_team(&path, &data).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"4\": \"full\""));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_team(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        save_team(&path, &TeamData::new()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
