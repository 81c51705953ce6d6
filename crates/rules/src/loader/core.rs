//! Core [`RuleLoader`] struct: filesystem-backed rule loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::rule::KnowledgeBase;
use crate::schema::RuleDocument;

use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Filesystem-backed rule loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and keeps the
/// enabled [`RuleDocument`]s in scan order. Entries of each directory are
/// visited in file-name order so the resulting knowledge base is the same on
/// every platform.
#[derive(Debug)]
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// Loaded documents with their source file, in scan order.
    documents: Vec<(PathBuf, RuleDocument)>,
}

impl RuleLoader {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
            documents: Vec::new(),
        }
    }

    /// Recursively scan the rules directory and load all YAML files,
    /// replacing previously loaded documents.
    ///
    /// Dotfiles (filenames starting with `.`), non-YAML files and disabled
    /// rules are skipped. Parse errors are reported per-file but do not abort
    /// the scan. A missing root directory is an error.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        if !self.rules_dir.is_dir() {
            return Err(RuleError::Validation(format!(
                "rules directory '{}' does not exist",
                self.rules_dir.display()
            )));
        }
        self.documents.clear();
        let mut results = Vec::new();
        let root = self.rules_dir.clone();
        self.scan_dir_recursive(&root, &mut results)?;
        info!(
            path = %self.rules_dir.display(),
            loaded = self.documents.len(),
            failed = results.iter().filter(|r| r.is_failed()).count(),
            "rules directory scanned"
        );
        Ok(results)
    }

    /// Recursively scan a directory for YAML rule files.
    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let mut paths = match fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };
        paths.sort();

        for path in paths {
            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let status = match Self::load_file(&path) {
                Ok(doc) if !doc.is_enabled() => {
                    info!(rule_id = %doc.id(), path = %path.display(), "rule disabled, skipping");
                    LoadStatus::Skipped {
                        reason: format!("rule '{}' is disabled", doc.id()),
                    }
                }
                Ok(doc) => {
                    let rule_id = doc.id().to_string();
                    info!(rule_id = %rule_id, kind = %doc.kind(), path = %path.display(), "loaded rule");
                    self.documents.push((path.clone(), doc));
                    LoadStatus::Loaded { rule_id }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    /// Parse and validate a single YAML rule file.
    pub fn load_file(path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        Self::parse_str(&contents)
    }

    /// Parse and validate a rule document from YAML text.
    ///
    /// Validation compiles the rule, so a bad timer is reported here rather
    /// than when the knowledge base is built.
    pub fn parse_str(yaml: &str) -> Result<RuleDocument> {
        let doc: RuleDocument = serde_yaml::from_str(yaml)?;
        if doc.id().trim().is_empty() {
            return Err(RuleError::Validation(
                "rule metadata.id must not be empty".to_string(),
            ));
        }
        doc.compile()?;
        Ok(doc)
    }

    /// Compile every loaded document into a knowledge base.
    ///
    /// Fails on a duplicate rule id across files.
    pub fn knowledge_base(&self) -> Result<KnowledgeBase> {
        build_knowledge_base(self.documents.iter().map(|(_, doc)| doc))
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Loaded (enabled) documents in scan order.
    pub fn documents(&self) -> impl Iterator<Item = &RuleDocument> {
        self.documents.iter().map(|(_, doc)| doc)
    }

    /// Source file of a loaded rule.
    pub fn path_of(&self, rule_id: &str) -> Option<&Path> {
        self.documents
            .iter()
            .find(|(_, doc)| doc.id() == rule_id)
            .map(|(path, _)| path.as_path())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Compile documents into a knowledge base, skipping disabled ones.
pub(crate) fn build_knowledge_base<'a>(
    docs: impl IntoIterator<Item = &'a RuleDocument>,
) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::default();
    for doc in docs.into_iter().filter(|d| d.is_enabled()) {
        kb.add(doc.compile()?)?;
    }
    Ok(kb)
}
