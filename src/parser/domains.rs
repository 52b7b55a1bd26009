//! Protected-domain list output and add/del/clear results.
//!
//! These commands print short localized messages; the outcome is decided by
//! the presence of a known keyword rather than by structure.

use super::normalize::{compact, has_restore_prompt, is_divider, strip_ansi};

const ADDED: &str = "ДОБАВЛЕН";
const ALREADY_LISTED: &str = "уже есть";
const REMOVED: &str = "УДАЛЕН";
const NOT_LISTED: &str = "отсутствует";
const CLEARED: &str = "ОЧИЩЕН";
const ALREADY_EMPTY: &str = "уже пуст";
const BACKUP_SAVED: &str = "сохранён в файл";

/// Domains from `kvas list`.
///
/// The list sits in the third block between divider lines. Dashes inside a
/// name (punycode `xn----...`) do not split blocks. An interactive restore
/// prompt means there is nothing to read yet.
pub fn parse_domain_list(output: &str) -> Vec<String> {
    let cleaned = strip_ansi(output);
    if has_restore_prompt(&cleaned) {
        tracing::debug!("kvas list is waiting on a restore prompt");
        return Vec::new();
    }

    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in cleaned.lines() {
        if is_divider(line) {
            blocks.push(Vec::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    let Some(block) = blocks.get(2) else {
        return Vec::new();
    };

    block
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyListed,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelOutcome {
    Removed,
    NotListed,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared { backup: Option<String> },
    AlreadyEmpty,
    Unrecognized,
}

pub fn parse_add_outcome(output: &str) -> AddOutcome {
    let text = compact(output);
    if text.contains(ADDED) {
        AddOutcome::Added
    } else if text.contains(ALREADY_LISTED) {
        AddOutcome::AlreadyListed
    } else {
        AddOutcome::Unrecognized
    }
}

pub fn parse_del_outcome(output: &str) -> DelOutcome {
    let text = compact(output);
    if text.contains(REMOVED) {
        DelOutcome::Removed
    } else if text.contains(NOT_LISTED) {
        DelOutcome::NotListed
    } else {
        DelOutcome::Unrecognized
    }
}

pub fn parse_clear_outcome(output: &str) -> ClearOutcome {
    let text = compact(output);
    if text.contains(CLEARED) {
        let backup = text
            .split_once(BACKUP_SAVED)
            .map(|(_, path)| path.trim())
            .filter(|path| !path.is_empty())
            .map(str::to_string);
        ClearOutcome::Cleared { backup }
    } else if text.contains(ALREADY_EMPTY) {
        ClearOutcome::AlreadyEmpty
    } else {
        ClearOutcome::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_OUTPUT: &str = "\
\x1b[1mЗащищённый список\x1b[0m
----------------------------------------------------
Всего доменов: 3
----------------------------------------------------
  example.com
  *.youtube.com

  rutracker.org
----------------------------------------------------
";

    #[test]
    fn test_domain_list() {
        assert_eq!(
            parse_domain_list(LIST_OUTPUT),
            vec!["example.com", "*.youtube.com", "rutracker.org"]
        );
    }

    #[test]
    fn test_domain_list_keeps_punycode_dashes() {
        let output = "Список\n-----\nВсего: 2\n-----\nxn----7sbb.xn--p1ai\nexample.com\n-----\n";
        assert_eq!(
            parse_domain_list(output),
            vec!["xn----7sbb.xn--p1ai", "example.com"]
        );
    }

    #[test]
    fn test_domain_list_restore_prompt() {
        let output = "Найдена резервная копия списка.\n? Восстановить список [Y/n]";
        assert!(parse_domain_list(output).is_empty());
    }

    #[test]
    fn test_domain_list_too_few_blocks() {
        assert!(parse_domain_list("Список пуст\n-----\n").is_empty());
        assert!(parse_domain_list("").is_empty());
    }

    #[test]
    fn test_add_outcome() {
        assert_eq!(parse_add_outcome("\x1b[32mexample.com ДОБАВЛЕН\x1b[0m"), AddOutcome::Added);
        assert_eq!(
            parse_add_outcome("Домен example.com уже есть в списке"),
            AddOutcome::AlreadyListed
        );
        assert_eq!(parse_add_outcome("kvas: not found"), AddOutcome::Unrecognized);
    }

    #[test]
    fn test_del_outcome() {
        assert_eq!(parse_del_outcome("example.com ---- УДАЛЕН"), DelOutcome::Removed);
        assert_eq!(
            parse_del_outcome("Домен example.com отсутствует в списке"),
            DelOutcome::NotListed
        );
        assert_eq!(parse_del_outcome(""), DelOutcome::Unrecognized);
    }

    #[test]
    fn test_clear_outcome() {
        assert_eq!(
            parse_clear_outcome(
                "Защищённый список ОЧИЩЕН\nСписок сохранён в файл   /opt/etc/kvas-wui/hosts.bak"
            ),
            ClearOutcome::Cleared {
                backup: Some("/opt/etc/kvas-wui/hosts.bak".to_string())
            }
        );
        assert_eq!(
            parse_clear_outcome("Список ОЧИЩЕН"),
            ClearOutcome::Cleared { backup: None }
        );
        assert_eq!(
            parse_clear_outcome("Защищённый список уже пуст"),
            ClearOutcome::AlreadyEmpty
        );
        assert_eq!(parse_clear_outcome("???"), ClearOutcome::Unrecognized);
    }
}
