use anyhow::Result;

pub const USAGE: &str =
    "usage: gap -b <branch> -m \"<commit message>\"  or  gap <branch> <commit message>";

/// Fully resolved arguments for the push sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushArgs {
    pub branch: String,
    pub message: String,
    pub debug: bool,
    pub allow_empty: bool,
}

impl PushArgs {
    /// Merge flag values with the positional fallback form.
    ///
    /// Whichever of branch / message was not supplied as a flag is filled
    /// from the positional arguments: the first positional is the branch,
    /// the remaining tokens joined become the message. Both must be
    /// non-empty before the sequence may run.
    pub fn resolve(
        branch: Option<String>,
        message: Option<Vec<String>>,
        positional: Vec<String>,
        debug: bool,
        allow_empty: bool,
    ) -> Result<Self> {
        let mut branch = branch.unwrap_or_default();
        let mut message = message.map(|words| words.join(" ")).unwrap_or_default();

        let mut positional = positional.into_iter();
        if branch.is_empty() {
            if let Some(first) = positional.next() {
                branch = first;
            }
        }
        if message.is_empty() {
            let rest: Vec<String> = positional.collect();
            message = rest.join(" ");
        }

        if branch.is_empty() || message.is_empty() {
            anyhow::bail!("{}", USAGE);
        }

        Ok(Self {
            branch,
            message,
            debug,
            allow_empty,
        })
    }
}
