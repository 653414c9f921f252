use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use plish_core::{normalize_gene_name, strip_version};

use crate::{parse_exon_lengths, DatabaseInfo, DbError, TranscriptEntry, TranscriptSource};

/// Prepared databases on disk, one directory per database:
///
/// ```text
/// <root>/<db>/<db>.fa     >transcript_id|gene_name, spliced sequence
/// <root>/<db>/<db>.exons  tab-separated, col 1 id, col 7 exon lengths
/// <root>/<db>/<db>.info   #comment, dbid=..., dbname=...
/// ```
#[derive(Debug, Clone)]
pub struct FlatFileDatabase {
    root: PathBuf,
}

impl FlatFileDatabase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_dir(&self, database: &str) -> PathBuf {
        self.root.join(database)
    }

    fn file(&self, database: &str, ext: &str) -> PathBuf {
        self.database_dir(database).join(format!("{database}.{ext}"))
    }
}

impl TranscriptSource for FlatFileDatabase {
    fn database_exists(&self, database: &str) -> Result<bool, DbError> {
        Ok(!database.is_empty() && self.database_dir(database).is_dir())
    }

    fn fetch_transcript(
        &self,
        database: &str,
        transcript_id: &str,
    ) -> Result<Option<TranscriptEntry>, DbError> {
        let wanted = strip_version(transcript_id);
        let reader = BufReader::new(File::open(self.file(database, "fa"))?);

        let mut gene_name: Option<String> = None;
        let mut sequence = String::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('>') {
                if gene_name.is_some() {
                    break;
                }
                let mut parts = header.splitn(2, '|');
                let id = parts.next().unwrap_or("").split_whitespace().next().unwrap_or("");
                if strip_version(id) == wanted {
                    gene_name = Some(normalize_gene_name(parts.next().unwrap_or("")));
                }
            } else if gene_name.is_some() {
                sequence.push_str(&trimmed.to_uppercase());
            }
        }

        Ok(gene_name.map(|gene_name| TranscriptEntry { gene_name, sequence }))
    }

    fn fetch_exon_lengths(&self, database: &str, transcript_id: &str) -> Result<Vec<u32>, DbError> {
        let wanted = strip_version(transcript_id);
        let path = self.file(database, "exons");
        let reader = BufReader::new(File::open(&path)?);

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split('\t').collect();
            if strip_version(fields[0].trim()) != wanted {
                continue;
            }
            let field = fields.get(6).ok_or_else(|| DbError::Malformed {
                path: path.clone(),
                line: i + 1,
                reason: format!("expected 7 columns, found {}", fields.len()),
            })?;
            return parse_exon_lengths(field).map_err(|reason| DbError::Malformed {
                path: path.clone(),
                line: i + 1,
                reason,
            });
        }

        Ok(Vec::new())
    }

    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DbError> {
        let mut infos = Vec::new();
        if !self.root.is_dir() {
            return Ok(infos);
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let Some(db) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let info_path = dir.join(format!("{db}.info"));
            if !info_path.is_file() {
                log::warn!("skipping {}: no info file", dir.display());
                continue;
            }
            infos.push(parse_info(&fs::read_to_string(&info_path)?, db));
        }

        Ok(infos)
    }
}

/// Parse an info file; missing keys fall back to the directory name.
pub fn parse_info(content: &str, fallback_id: &str) -> DatabaseInfo {
    let mut info = DatabaseInfo {
        id: fallback_id.to_string(),
        name: fallback_id.to_string(),
        comment: None,
    };
    for line in content.lines() {
        if let Some(comment) = line.strip_prefix('#') {
            info.comment = Some(comment.trim().to_string());
        } else if let Some(id) = line.strip_prefix("dbid=") {
            info.id = id.trim().to_string();
        } else if let Some(name) = line.strip_prefix("dbname=") {
            info.name = name.trim().to_string();
        }
    }
    info
}
