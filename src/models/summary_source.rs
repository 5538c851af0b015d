use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions worth sharing: markdown, scripts, components, config, markup, styles
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["md", "js", "vue", "json", "html", "css"];

pub const DEFAULT_OUTPUT_FILE: &str = "result.txt";

const CLOSING_INSTRUCTIONS: &str = "不论你进行如何修改，一定保证不会破坏已有的功能，前端修改一定要保持相同的主题风格，并保证节省开发者工作量的原则，请给出完整的函数代码并告诉我在哪里进行覆盖，直接告诉我在哪里进行怎样的修改就好了，不用给出全部文件代码\n\n";

/// A single input of the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SummaryEntry {
    /// Prose included verbatim
    Document(PathBuf),
    /// A source file, or a directory whose allow-listed files are included;
    /// rendered as fenced blocks
    Source(PathBuf),
}

impl SummaryEntry {
    pub fn path(&self) -> &Path {
        match self {
            SummaryEntry::Document(path) | SummaryEntry::Source(path) => path,
        }
    }
}

/// A header line followed by the text of its entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub header: String,
    pub entries: Vec<SummaryEntry>,
}

impl SummarySection {
    pub fn new(header: impl Into<String>, entries: Vec<SummaryEntry>) -> Self {
        Self {
            header: header.into(),
            entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryPlan {
    /// Fence annotations show paths relative to this directory
    pub root: PathBuf,
    pub sections: Vec<SummarySection>,
    pub closing: String,
    pub output: PathBuf,
    pub allowed_extensions: Vec<String>,
}

impl SummaryPlan {
    pub fn new(root: impl Into<PathBuf>, sections: Vec<SummarySection>) -> Self {
        let root = root.into();
        Self {
            output: root.join(DEFAULT_OUTPUT_FILE),
            root,
            sections,
            closing: CLOSING_INSTRUCTIONS.to_string(),
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Case-sensitive suffix match on the file name, so `NOTES.MD` is
    /// rejected and a file named just `.md` is kept
    pub fn accepts(&self, file_name: &str) -> bool {
        self.allowed_extensions.iter().any(|allowed| {
            file_name
                .strip_suffix(allowed.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    /// API doc, readme, preload scripts, the three frontends and the docs
    /// folder, each introduced for a reader that has never seen the project
    pub fn standard(root: &Path) -> Self {
        let source = |parts: &[&str]| SummaryEntry::Source(join_all(root, parts));

        let sections = vec![
            SummarySection::new(
                "以下是Utools插件的开发文档",
                vec![SummaryEntry::Document(root.join("utools-api-doc.md"))],
            ),
            SummarySection::new(
                "以下是AI Anywhere的README文件",
                vec![SummaryEntry::Document(root.join("README.md"))],
            ),
            SummarySection::new(
                "以下是预加载文件和主页面,preload，preload.js是主界面的预加载文件、window_preload.js是独立窗口界面的预加载文件，其它是其他工具文件",
                vec![source(&["apps", "backend", "src"])],
            ),
            SummarySection::new(
                "以下是主页面的前端代码，在./apps/main/目录下，是设置页面，其预加载文件为preload.js",
                vec![
                    source(&["apps", "main", "package.json"]),
                    source(&["apps", "main", "vite.config.js"]),
                    source(&["apps", "main", "index.html"]),
                    source(&["apps", "main", "src", "components"]),
                    source(&["apps", "main", "src", "App.vue"]),
                    source(&["apps", "main", "src", "locales"]),
                ],
            ),
            SummarySection::new(
                "以下是独立窗口的前端代码，在./apps/window/目录下，是独立窗口文件，其预加载文件为window_preload.js",
                vec![
                    source(&["apps", "window", "package.json"]),
                    source(&["apps", "window", "vite.config.js"]),
                    source(&["apps", "window", "src", "App.vue"]),
                    source(&["apps", "window", "src", "components"]),
                    source(&["apps", "window", "src", "utils"]),
                    source(&["apps", "window", "src", "assets"]),
                ],
            ),
            SummarySection::new(
                "以下是其他窗口的前端代码，在./apps/fast-window/目录下，是独立窗口文件，其预加载文件为fast_window_preload.js",
                vec![source(&["apps", "fast-window"])],
            ),
            SummarySection::new(
                "以下是相关说明文档，在./docs/目录下",
                vec![source(&["docs"])],
            ),
        ];

        Self::new(root, sections)
    }
}

fn join_all(root: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(root.to_path_buf(), |path, part| path.join(part))
}
