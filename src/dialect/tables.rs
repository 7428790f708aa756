//! Built-in lookup data for the dialect registry and the eligibility filters.
//!
//! Everything here is plain constant data. Extension keys are lowercase and
//! carry no leading dot; special file names are matched exactly.

/// An ordered extension rule. The first rule listing an extension wins.
pub struct ExtensionRule {
  pub extensions: &'static [&'static str],
  pub start: &'static str,
  pub end: &'static str,
}

pub const EXTENSION_RULES: &[ExtensionRule] = &[
  ExtensionRule {
    extensions: &[
      "py", "pyi", "pyw", "sh", "bash", "zsh", "fish", "ps1", "psm1", "psd1", "rb", "rake", "gemspec", "pl", "pm", "r",
      "yaml", "yml", "toml", "tf", "tfvars", "hcl", "nix", "nim", "nims", "cr", "pro", "pri", "cmake", "mk", "mak",
      "conf", "cfg", "properties", "ex", "exs", "jl", "coffee", "gd", "awk", "tcl", "bzl", "star", "dockerfile",
      "gitignore", "dockerignore", "htaccess",
    ],
    start: "#",
    end: "",
  },
  ExtensionRule {
    extensions: &[
      "js", "mjs", "cjs", "ts", "mts", "cts", "jsx", "tsx", "c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "ino",
      "cs", "java", "kt", "kts", "scala", "sc", "go", "rs", "swift", "dart", "groovy", "gradle", "m", "mm", "fs",
      "fsx", "fsi", "v", "sv", "pas", "php", "pug", "jade", "zig", "sol", "proto", "d", "hx",
    ],
    start: "//",
    end: "",
  },
  ExtensionRule {
    extensions: &["css", "scss", "less", "styl"],
    start: "/*",
    end: "*/",
  },
  ExtensionRule {
    extensions: &[
      "html", "htm", "xhtml", "xml", "xsl", "xslt", "xsd", "svg", "ui", "qrc", "vue", "svelte", "astro", "hbs",
      "handlebars", "ejs", "erb", "jsp", "aspx", "cshtml", "razor", "mustache", "mst", "mdx", "plist",
    ],
    start: "<!--",
    end: "-->",
  },
  ExtensionRule {
    extensions: &["twig", "jinja", "jinja2", "j2", "njk", "nunjucks"],
    start: "{#",
    end: "#}",
  },
  ExtensionRule {
    extensions: &["clj", "cljs", "cljc", "edn", "el", "lisp", "lsp", "scm", "ss", "rkt"],
    start: ";;",
    end: "",
  },
  ExtensionRule {
    extensions: &["asm", "s", "ini"],
    start: ";",
    end: "",
  },
  ExtensionRule {
    extensions: &["sql", "lua", "hs", "lhs", "vhd", "vhdl", "adb", "ads", "elm", "purs"],
    start: "--",
    end: "",
  },
  ExtensionRule {
    extensions: &["ml", "mli", "sml"],
    start: "(*",
    end: "*)",
  },
  ExtensionRule {
    extensions: &["vb", "vbs", "bas"],
    start: "'",
    end: "",
  },
  ExtensionRule {
    extensions: &["f90", "f95", "f03", "f08"],
    start: "!",
    end: "",
  },
  ExtensionRule {
    extensions: &["cob", "cbl", "cpy"],
    start: "*",
    end: "",
  },
  ExtensionRule {
    extensions: &["erl", "hrl", "tex", "sty"],
    start: "%",
    end: "",
  },
  ExtensionRule {
    extensions: &["bat", "cmd"],
    start: "REM",
    end: "",
  },
];

/// Exact file names that map straight to a dialect, bypassing extension rules.
pub const SPECIAL_FILES: &[(&str, &str, &str)] = &[
  (".gitignore", "#", ""),
  (".dockerignore", "#", ""),
  (".npmignore", "#", ""),
  (".prettierignore", "#", ""),
  (".eslintignore", "#", ""),
  (".env", "#", ""),
  (".editorconfig", "#", ""),
  (".gitattributes", "#", ""),
  (".flake8", "#", ""),
  (".pylintrc", "#", ""),
  (".htaccess", "#", ""),
  (".bashrc", "#", ""),
  (".zshrc", "#", ""),
  (".profile", "#", ""),
  ("Makefile", "#", ""),
  ("makefile", "#", ""),
  ("GNUmakefile", "#", ""),
  ("Dockerfile", "#", ""),
  ("Containerfile", "#", ""),
  ("Pipfile", "#", ""),
  ("Gemfile", "#", ""),
  ("Rakefile", "#", ""),
  ("Procfile", "#", ""),
  ("Vagrantfile", "#", ""),
  ("Justfile", "#", ""),
  ("justfile", "#", ""),
  ("BUILD", "#", ""),
  ("WORKSPACE", "#", ""),
  ("CMakeLists.txt", "#", ""),
  ("requirements.txt", "#", ""),
  ("requirements-dev.txt", "#", ""),
  ("constraints.txt", "#", ""),
  ("setup.cfg", "#", ""),
];

/// Special-name prefixes, for families such as `.env.local` or `.env.production`.
pub const SPECIAL_FILE_PREFIXES: &[(&str, &str, &str)] = &[(".env.", "#", ""), ("Dockerfile.", "#", "")];

/// Extensions whose files open with declarations that must stay first.
pub const XML_LIKE_EXTENSIONS: &[&str] = &[
  "html", "htm", "xhtml", "xml", "xsl", "xslt", "xsd", "svg", "ui", "qrc", "plist", "php", "ejs", "erb", "jsp",
  "aspx", "cshtml", "razor", "hbs", "handlebars", "mustache", "mst", "mdx",
];

/// Single-file components made of several top-level sections.
pub const MULTI_SECTION_EXTENSIONS: &[&str] = &["vue", "svelte", "astro"];

/// Extensions whose content is sniffed before the extension rule applies.
pub const SNIFFED_EXTENSIONS: &[&str] = &["ts"];

pub const BINARY_EXTENSIONS: &[&str] = &[
  "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "webp", "tif", "tiff", "psd", "pdf", "zip", "gz", "tgz", "tar",
  "bz2", "xz", "7z", "rar", "jar", "war", "ear", "exe", "dll", "so", "dylib", "a", "lib", "o", "obj", "class", "pyc",
  "pyo", "pyd", "whl", "egg", "bin", "dat", "db", "sqlite", "sqlite3", "woff", "woff2", "ttf", "otf", "eot", "mp3",
  "mp4", "m4a", "wav", "flac", "ogg", "avi", "mov", "mkv", "webm", "wasm", "iso", "dmg", "pkg", "deb", "rpm", "npy",
  "pkl", "parquet",
];

/// Files that never receive a header regardless of extension.
pub const IGNORED_FILES: &[&str] = &[
  "package-lock.json",
  "yarn.lock",
  "pnpm-lock.yaml",
  "Cargo.lock",
  "poetry.lock",
  "Pipfile.lock",
  "Gemfile.lock",
  "composer.lock",
  "go.sum",
  ".prettierrc",
  ".eslintrc",
  ".babelrc",
  ".DS_Store",
  "LICENSE",
  "LICENSE.txt",
  "LICENSE.md",
  "LICENCE",
  "COPYING",
  "COPYING.txt",
  "NOTICE",
  "NOTICE.txt",
  crate::backup::BACKUP_FILENAME,
];

/// Document-type extensions left alone unless the file is a special file.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "json", "jsonc", "lock", "csv", "tsv", "log"];

/// Directories pruned from every traversal.
pub const IGNORED_DIRECTORIES: &[&str] = &[
  ".git",
  ".hg",
  ".svn",
  "node_modules",
  "__pycache__",
  "venv",
  ".venv",
  "target",
  "dist",
  "build",
  ".tox",
  ".nox",
  ".mypy_cache",
  ".pytest_cache",
  ".ruff_cache",
  ".idea",
  ".vscode",
  ".next",
  ".nuxt",
];
