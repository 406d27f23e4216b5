use std::borrow::Cow;
use std::path::PathBuf;

/// Raw value of one option as the caller set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Switch(bool),
    Text(String),
    TextList(Vec<String>),
    File(PathBuf),
    FileList(Vec<PathBuf>),
}

impl ArgValue {
    /// `false`, empty strings, empty paths and lists without a non-empty element
    /// are all "absent".
    pub fn is_present(&self) -> bool {
        match self {
            ArgValue::Switch(on) => *on,
            ArgValue::Text(s) => !s.is_empty(),
            ArgValue::TextList(items) => items.iter().any(|s| !s.is_empty()),
            ArgValue::File(path) => !path.as_os_str().is_empty(),
            ArgValue::FileList(items) => items.iter().any(|p| !p.as_os_str().is_empty()),
        }
    }

    fn items(&self) -> Vec<Cow<'_, str>> {
        match self {
            ArgValue::Switch(_) => Vec::new(),
            ArgValue::Text(s) => vec![Cow::Borrowed(s.as_str())],
            ArgValue::TextList(items) => items
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| Cow::Borrowed(s.as_str()))
                .collect(),
            ArgValue::File(path) => vec![path.to_string_lossy()],
            ArgValue::FileList(items) => items
                .iter()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy())
                .collect(),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Switch(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Text(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Text(v)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(v: Vec<String>) -> Self {
        ArgValue::TextList(v)
    }
}

impl From<PathBuf> for ArgValue {
    fn from(v: PathBuf) -> Self {
        ArgValue::File(v)
    }
}

impl From<Vec<PathBuf>> for ArgValue {
    fn from(v: Vec<PathBuf>) -> Self {
        ArgValue::FileList(v)
    }
}

/// How an option turns into command-line tokens.
///
/// List values apply the style to every element, in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgStyle {
    /// A bare switch such as `-fPIC`.
    Flag(&'static str),
    /// Flag and value as two tokens: `-o out.o`.
    Separate(&'static str),
    /// Flag and value glued into one token: `-L/usr/lib`, `--hash-style=gnu`.
    Joined(&'static str),
    /// The value itself.
    Positional,
    /// Value is a key into a fixed table; the mapped token is emitted.
    Lookup(&'static [(&'static str, &'static str)]),
}

impl ArgStyle {
    pub fn render(self, value: &ArgValue) -> Vec<String> {
        if !value.is_present() {
            return Vec::new();
        }

        if let ArgValue::Switch(_) = value {
            return match self {
                ArgStyle::Flag(flag) | ArgStyle::Separate(flag) | ArgStyle::Joined(flag) => {
                    vec![flag.to_string()]
                }
                ArgStyle::Positional | ArgStyle::Lookup(_) => Vec::new(),
            };
        }

        let mut out = Vec::new();
        for item in value.items() {
            self.render_item(&item, &mut out);
        }
        out
    }

    fn render_item(self, item: &str, out: &mut Vec<String>) {
        match self {
            ArgStyle::Flag(flag) => out.push(flag.to_string()),
            ArgStyle::Separate(flag) => {
                out.push(flag.to_string());
                out.push(item.to_string());
            }
            ArgStyle::Joined(flag) => out.push(format!("{flag}{item}")),
            ArgStyle::Positional => out.push(item.to_string()),
            ArgStyle::Lookup(table) => {
                if let Some((_, token)) = table.iter().find(|(key, _)| *key == item) {
                    out.push(token.to_string());
                }
            }
        }
    }
}
