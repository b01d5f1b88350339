use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use nexus_social::{UserRecord, UserStore, Username};
use tracing::warn;

/// One `username password` pair per line.
#[derive(Clone, Debug)]
pub struct FlatFileStore {
    path: PathBuf,
}

impl FlatFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_line(line: &str) -> Option<UserRecord> {
    let mut fields = line.split_whitespace();
    let username = Username::parse(fields.next()?)?;
    let password = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some(UserRecord::new(username, password))
}

impl UserStore for FlatFileStore {
    type Error = anyhow::Error;

    /// A missing file is an empty store.
    fn load_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(error).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let mut records = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(record) => records.push(record),
                None => warn!(
                    path = %self.path.display(),
                    line = number + 1,
                    "skipping malformed user line"
                ),
            }
        }
        Ok(records)
    }

    fn save_all(&self, records: &[UserRecord]) -> anyhow::Result<()> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(record.username.as_str());
            contents.push(' ');
            contents.push_str(&record.password);
            contents.push('\n');
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}
