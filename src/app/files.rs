//! Open Solidity sources and save converted Clarity through native dialogs

use super::App;
use crate::constants::DEPLOY_CONTRACT_NAME;
use tracing::{info, warn};

/// `contract MyToken is ERC721 {` -> `my-token.clar`; falls back to the
/// deploy contract name when no contract declaration is found.
pub(crate) fn suggested_file_name(solidity: &str) -> String {
    let name = solidity
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.starts_with("//"))
        .find_map(|line| {
            let mut words = line.split_whitespace();
            while let Some(word) = words.next() {
                if word == "contract" {
                    return words.next();
                }
            }
            None
        })
        .map(|ident| ident.trim_end_matches('{'))
        .filter(|ident| !ident.is_empty())
        .map(kebab_case)
        .unwrap_or_else(|| DEPLOY_CONTRACT_NAME.to_string());
    format!("{}.clar", name)
}

fn kebab_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower = false;
    for c in ident.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
        if c == '_' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower {
            out.push('-');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_lowercase());
    }
    out
}

impl App {
    pub(crate) fn open_solidity_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Solidity", &["sol"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };

        match std::fs::read_to_string(&path) {
            Ok(source) => {
                info!(path = %path.display(), bytes = source.len(), "Loaded Solidity source");
                self.converter.state.input = source;
                self.file_notice = None;
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read source file");
                self.file_notice = Some(format!("Could not read {}: {}", path.display(), e));
            }
        }
    }

    pub(crate) fn save_clarity_file(&mut self) {
        let output = self.converter.state.output();
        if output.is_empty() {
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Clarity", &["clar"])
            .set_file_name(suggested_file_name(&self.converter.state.input))
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, output) {
            Ok(()) => {
                info!(path = %path.display(), "Saved Clarity output");
                self.file_notice = None;
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to save Clarity output");
                self.file_notice = Some(format!("Could not save {}: {}", path.display(), e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_file_after_first_contract() {
        let src = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n\ncontract MyNFTCollection is ERC721 {\n}";
        assert_eq!(suggested_file_name(src), "my-nftcollection.clar");
    }

    #[test]
    fn brace_attached_to_name() {
        assert_eq!(suggested_file_name("contract Token{ }"), "token.clar");
    }

    #[test]
    fn snake_case_and_digits() {
        assert_eq!(suggested_file_name("abstract contract Game_Items2 {}"), "game-items2.clar");
    }

    #[test]
    fn commented_contract_is_skipped() {
        assert_eq!(
            suggested_file_name("// contract Old {}\ncontract NewOne {}"),
            "new-one.clar"
        );
    }

    #[test]
    fn no_contract_falls_back() {
        assert_eq!(suggested_file_name("pragma solidity ^0.8.0;"), "converted-contract.clar");
        assert_eq!(suggested_file_name(""), "converted-contract.clar");
    }
}
