use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::{MonodbError, MonodbResult};

use super::TemplateCollection;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A script to render from a named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDef {
    /// The file name of the script.
    pub script_name: String,

    /// The template to render.
    pub template_name: &'static str,

    /// Whether the file gets the executable bit.
    pub executable: bool,
}

/// Scripts rendered from one collection with the same data into the same directory.
#[derive(Debug)]
pub struct ScriptBatch<'a, T> {
    /// Where the templates come from.
    pub collection: &'a TemplateCollection,

    /// The data of every script in the batch.
    pub data: &'a T,

    /// The target directory.
    pub sandbox_dir: &'a Path,

    /// The scripts, written in order.
    pub scripts: Vec<ScriptDef>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ScriptDef {
    /// An executable script.
    pub fn executable(script_name: impl Into<String>, template_name: &'static str) -> Self {
        Self {
            script_name: script_name.into(),
            template_name,
            executable: true,
        }
    }

    /// A plain file.
    pub fn plain(script_name: impl Into<String>, template_name: &'static str) -> Self {
        Self {
            script_name: script_name.into(),
            template_name,
            executable: false,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Renders `text` with `data`.
///
/// Fails when the text references a field `data` does not have, or has a syntax error. The same
/// text and data always render to the same output.
pub fn fill(name: &str, text: &str, data: &impl Serialize) -> MonodbResult<String> {
    let template_error = |source| MonodbError::Template {
        name: name.to_string(),
        source,
    };

    let context = Context::from_serialize(data).map_err(template_error)?;
    Tera::one_off(text, &context, false).map_err(template_error)
}

/// Renders the template called `template_name` from `collection`.
pub fn fill_template(
    collection: &TemplateCollection,
    template_name: &str,
    data: &impl Serialize,
) -> MonodbResult<String> {
    let template = collection.get(template_name)?;
    fill(template.get_name(), template.get_contents(), data)
}

/// Renders a template into `dir/script_name`.
pub async fn write_script(
    collection: &TemplateCollection,
    script_name: &str,
    template_name: &str,
    dir: &Path,
    data: &impl Serialize,
    executable: bool,
) -> MonodbResult<PathBuf> {
    let text = fill_template(collection, template_name, data)?;
    let path = dir.join(script_name);

    if executable {
        monoutils::write_executable(&path, text).await?;
    } else {
        tokio::fs::write(&path, text).await?;
    }

    tracing::trace!("wrote {}", path.display());
    Ok(path)
}

/// Renders every script of a batch, in order.
///
/// Stops at the first failure. Scripts written before it stay on disk.
pub async fn write_scripts<T: Serialize>(batch: &ScriptBatch<'_, T>) -> MonodbResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(batch.scripts.len());
    for script in &batch.scripts {
        let path = write_script(
            batch.collection,
            &script.script_name,
            script.template_name,
            batch.sandbox_dir,
            batch.data,
            script.executable,
        )
        .await?;

        written.push(path);
    }

    Ok(written)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;
    use crate::templates::{
        ReplicationOptionsData, ScriptHeader, Template, GROUP_TEMPLATES, TMPL_GROUP_REPL_OPTIONS,
    };

    #[derive(Serialize)]
    struct Greeting {
        name: String,
        ports: Vec<u16>,
    }

    fn greeting() -> Greeting {
        Greeting {
            name: "node1".to_string(),
            ports: vec![20001, 20002],
        }
    }

    #[test]
    fn test_fill_is_deterministic() {
        let text = "hello {{ name }}:{% for p in ports %} {{ p }}{% endfor %}";
        let first = fill("greeting", text, &greeting()).unwrap();
        let second = fill("greeting", text, &greeting()).unwrap();

        assert_eq!(first, "hello node1: 20001 20002");
        assert_eq!(first, second);
    }

    #[test]
    fn test_fill_rejects_missing_placeholder() {
        let err = fill("greeting", "hello {{ nickname }}", &greeting()).unwrap_err();
        match err {
            MonodbError::Template { name, .. } => assert_eq!(name, "greeting"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_fill_rejects_syntax_error() {
        assert!(fill("greeting", "hello {{ name ", &greeting()).is_err());
    }

    #[test]
    fn test_group_options_pad_base_port() {
        let data = ReplicationOptionsData::new(20000, "127.0.0.1:20126", "127.0.0.1:20126", true);
        let text = fill_template(&GROUP_TEMPLATES, TMPL_GROUP_REPL_OPTIONS, &data).unwrap();

        assert!(text.contains("aaaaaaaa-aaaa-aaaa-aaaa-aaaa00020000"));
        assert!(text.contains("loose-group-replication-group-seeds=127.0.0.1:20126"));
        assert!(text.contains("single-primary-mode=ON"));
    }

    #[tokio::test]
    async fn test_write_scripts_keeps_earlier_scripts_on_failure() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let collection = TemplateCollection::from([
            Template::new("good", "", "", "#!{{ shell_path }}\necho ok\n"),
            Template::new("bad", "", "", "#!{{ shell_path }}\necho {{ missing }}\n"),
        ]);
        let data = ScriptHeader::now("/bin/sh");

        let batch = ScriptBatch {
            collection: &collection,
            data: &data,
            sandbox_dir: dir.path(),
            scripts: vec![
                ScriptDef::executable("first", "good"),
                ScriptDef::executable("second", "bad"),
                ScriptDef::executable("third", "good"),
            ],
        };

        assert!(write_scripts(&batch).await.is_err());

        let first = dir.path().join("first");
        assert_eq!(tokio::fs::read_to_string(&first).await?, "#!/bin/sh\necho ok\n");
        let mode = tokio::fs::metadata(&first).await?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(!dir.path().join("second").exists());
        assert!(!dir.path().join("third").exists());

        Ok(())
    }
}
