use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

pub const JOURNALS_FOLDER: &str = "journals";
pub const PAGES_FOLDER: &str = "pages";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphOverrides {
    pub db: PathBuf,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
    pub home_dir: Option<PathBuf>,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        let home_dir = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Ok(Self { cwd, home_dir })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub graph_root: PathBuf,
    pub journals_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "graph_root={}\njournals_dir={}\npages_dir={}\nstate_dir={}\nconfig_path={} ({})",
            normalize_for_display(&self.graph_root),
            normalize_for_display(&self.journals_dir),
            normalize_for_display(&self.pages_dir),
            normalize_for_display(&self.state_dir),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct GraphStatus {
    pub journals_exists: bool,
    pub pages_exists: bool,
    pub warnings: Vec<String>,
}

/// Resolve the graph root and config path. The root comes from `--db` with a
/// leading `~` expanded and the result canonicalized; a root that does not
/// exist or cannot be read fails here, before any file is touched.
pub fn resolve_graph(context: &ResolutionContext, overrides: &GraphOverrides) -> Result<ResolvedPaths> {
    resolve_graph_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_graph_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &GraphOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = expand_home(&overrides.db, context.home_dir.as_deref());
    let absolute = absolutize(&expanded, &context.cwd);
    let graph_root = fs::canonicalize(&absolute)
        .with_context(|| format!("graph root is not accessible: {}", absolute.display()))?;

    let journals_dir = graph_root.join(JOURNALS_FOLDER);
    let pages_dir = graph_root.join(PAGES_FOLDER);
    let state_dir = graph_root.join(".datefix");

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &context.cwd), ValueSource::Flag)
    } else if let Some(value) = lookup_env("DATEFIX_CONFIG") {
        (
            absolutize(Path::new(value.trim()), &context.cwd),
            ValueSource::Env,
        )
    } else {
        (state_dir.join("config.toml"), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        graph_root,
        journals_dir,
        pages_dir,
        state_dir,
        config_path,
        config_source,
    })
}

/// A missing journals/ or pages/ directory is a warning, not an error: that
/// side of the graph simply contributes zero files.
pub fn inspect_graph(paths: &ResolvedPaths) -> GraphStatus {
    let journals_exists = paths.journals_dir.is_dir();
    let pages_exists = paths.pages_dir.is_dir();
    let mut warnings = Vec::new();
    if !journals_exists {
        warnings.push(format!(
            "journals directory missing: {}",
            normalize_for_display(&paths.journals_dir)
        ));
    }
    if !pages_exists {
        warnings.push(format!(
            "pages directory missing: {}",
            normalize_for_display(&paths.pages_dir)
        ));
    }
    GraphStatus {
        journals_exists,
        pages_exists,
        warnings,
    }
}

fn expand_home(path: &Path, home_dir: Option<&Path>) -> PathBuf {
    let Some(home) = home_dir else {
        return path.to_path_buf();
    };
    if path == Path::new("~") {
        return home.to_path_buf();
    }
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{
        GraphOverrides, ResolutionContext, ValueSource, expand_home, inspect_graph, resolve_graph,
        resolve_graph_with_lookup,
    };

    fn context(cwd: &Path) -> ResolutionContext {
        ResolutionContext {
            cwd: cwd.to_path_buf(),
            home_dir: None,
        }
    }

    #[test]
    fn expand_home_replaces_leading_tilde() {
        let home = PathBuf::from("/home/user");
        assert_eq!(
            expand_home(Path::new("~/graph"), Some(&home)),
            PathBuf::from("/home/user/graph")
        );
        assert_eq!(expand_home(Path::new("~"), Some(&home)), home);
    }

    #[test]
    fn expand_home_leaves_other_paths_alone() {
        let home = PathBuf::from("/home/user");
        assert_eq!(
            expand_home(Path::new("/srv/graph"), Some(&home)),
            PathBuf::from("/srv/graph")
        );
        assert_eq!(
            expand_home(Path::new("~other/graph"), Some(&home)),
            PathBuf::from("~other/graph")
        );
        assert_eq!(
            expand_home(Path::new("~/graph"), None),
            PathBuf::from("~/graph")
        );
    }

    #[test]
    fn resolve_canonicalizes_relative_root_against_cwd() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("graph")).expect("create graph");

        let overrides = GraphOverrides {
            db: PathBuf::from("graph"),
            config: None,
        };
        let resolved = resolve_graph(&context(temp.path()), &overrides).expect("resolve");
        assert_eq!(
            resolved.graph_root,
            fs::canonicalize(temp.path().join("graph")).expect("canonicalize")
        );
        assert_eq!(resolved.journals_dir, resolved.graph_root.join("journals"));
        assert_eq!(resolved.pages_dir, resolved.graph_root.join("pages"));
    }

    #[test]
    fn resolve_fails_for_missing_root() {
        let temp = tempdir().expect("tempdir");
        let overrides = GraphOverrides {
            db: temp.path().join("absent"),
            config: None,
        };
        let error = resolve_graph(&context(temp.path()), &overrides).expect_err("must fail");
        assert!(error.to_string().contains("graph root is not accessible"));
    }

    #[test]
    fn config_path_prefers_flag_over_env() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("graph")).expect("create graph");

        let overrides = GraphOverrides {
            db: temp.path().join("graph"),
            config: Some(temp.path().join("from-flag.toml")),
        };
        let env = HashMap::from([(
            "DATEFIX_CONFIG".to_string(),
            temp.path()
                .join("from-env.toml")
                .to_string_lossy()
                .to_string(),
        )]);

        let resolved = resolve_graph_with_lookup(&context(temp.path()), &overrides, |key| {
            env.get(key).cloned()
        })
        .expect("resolve");
        assert_eq!(resolved.config_path, temp.path().join("from-flag.toml"));
        assert_eq!(resolved.config_source, ValueSource::Flag);
    }

    #[test]
    fn config_path_falls_back_to_env_then_default() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("graph")).expect("create graph");
        let overrides = GraphOverrides {
            db: temp.path().join("graph"),
            config: None,
        };

        let env = HashMap::from([(
            "DATEFIX_CONFIG".to_string(),
            temp.path()
                .join("from-env.toml")
                .to_string_lossy()
                .to_string(),
        )]);
        let resolved = resolve_graph_with_lookup(&context(temp.path()), &overrides, |key| {
            env.get(key).cloned()
        })
        .expect("resolve");
        assert_eq!(resolved.config_path, temp.path().join("from-env.toml"));
        assert_eq!(resolved.config_source, ValueSource::Env);

        let resolved =
            resolve_graph_with_lookup(&context(temp.path()), &overrides, |_| None).expect("resolve");
        assert_eq!(resolved.config_path, resolved.state_dir.join("config.toml"));
        assert_eq!(resolved.config_source, ValueSource::Default);
    }

    #[test]
    fn inspect_reports_missing_note_directories() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("graph").join("journals")).expect("create journals");
        let overrides = GraphOverrides {
            db: temp.path().join("graph"),
            config: None,
        };
        let resolved = resolve_graph(&context(temp.path()), &overrides).expect("resolve");

        let status = inspect_graph(&resolved);
        assert!(status.journals_exists);
        assert!(!status.pages_exists);
        assert_eq!(status.warnings.len(), 1);
        assert!(status.warnings[0].contains("pages directory missing"));
    }
}
