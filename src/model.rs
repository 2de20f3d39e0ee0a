use std::path::PathBuf;

use crossterm::style::Stylize;

/// A shell configuration file found on disk. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConfigFile {
    pub name: String,
    pub path: PathBuf,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceValue {
    File(PathBuf),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Rendered menu text, may carry ANSI styling.
    pub label: String,
    pub value: ChoiceValue,
    pub short_label: String,
}

impl Choice {
    pub fn quit(color: bool) -> Self {
        let label = if color { "Quit".red().to_string() } else { "Quit".to_string() };
        Self { label, value: ChoiceValue::Quit, short_label: "Quit".to_string() }
    }
}

impl From<(&ConfigFile, bool)> for Choice {
    fn from((file, color): (&ConfigFile, bool)) -> Self {
        let path = file.path.display().to_string();
        let label = match (file.is_primary, color) {
            (true, true) => format!("{} {} {}", file.name.clone().bold().green(), "(main)".green(), path.dark_grey()),
            (true, false) => format!("{} (main) {path}", file.name),
            (false, true) => format!("{} {}", file.name.clone().bold(), path.dark_grey()),
            (false, false) => format!("{} {path}", file.name),
        };
        Self {
            label,
            value: ChoiceValue::File(file.path.clone()),
            short_label: file.name.clone(),
        }
    }
}

/// One choice per file in order, with the quit choice appended last.
pub fn choices_for(files: &[ConfigFile], color: bool) -> Vec<Choice> {
    files
        .iter()
        .map(|f| Choice::from((f, color)))
        .chain(std::iter::once(Choice::quit(color)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, primary: bool) -> ConfigFile {
        ConfigFile { name: name.into(), path: PathBuf::from("/h").join(name), is_primary: primary }
    }

    #[test]
    fn quit_choice_is_appended_last() {
        let files = vec![file(".zshrc", true), file("aliases.zsh", false)];
        let choices = choices_for(&files, false);
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].value, ChoiceValue::File(PathBuf::from("/h/.zshrc")));
        assert_eq!(choices[1].short_label, "aliases.zsh");
        assert_eq!(choices[2].value, ChoiceValue::Quit);
        assert_eq!(choices.iter().filter(|c| c.value == ChoiceValue::Quit).count(), 1);
    }

    #[test]
    fn plain_labels_have_no_escape_codes() {
        let choices = choices_for(&[file(".zshrc", true)], false);
        assert_eq!(choices[0].label, ".zshrc (main) /h/.zshrc");
        assert!(!choices[0].label.contains('\x1b'));
        assert_eq!(choices[1].label, "Quit");
    }

    #[test]
    fn colored_labels_keep_the_name() {
        let choices = choices_for(&[file("env.zsh", false)], true);
        assert!(choices[0].label.contains("env.zsh"));
        assert!(choices[0].label.contains('\x1b'));
    }
}
