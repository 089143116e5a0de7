// 🏷️ Category - closed set of spending/income categories
//
// Categories arrive as free text from forms and CSV exports, often with the
// Portuguese labels the app was first built with ("Alimentação", "Saúde").
// Both spellings parse to the same variant; serialization uses snake_case.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Health,
    Education,
    Home,
    Clothing,
    Technology,
    Income,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Home,
        Category::Clothing,
        Category::Technology,
        Category::Income,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Education => "education",
            Category::Home => "home",
            Category::Clothing => "clothing",
            Category::Technology => "technology",
            Category::Income => "income",
            Category::Other => "other",
        }
    }

    /// Portuguese display label used by the app
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Alimentação",
            Category::Transport => "Transporte",
            Category::Entertainment => "Entretenimento",
            Category::Health => "Saúde",
            Category::Education => "Educação",
            Category::Home => "Casa",
            Category::Clothing => "Roupas",
            Category::Technology => "Tecnologia",
            Category::Income => "Receita",
            Category::Other => "Outros",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let category = match normalized.as_str() {
            "food" | "alimentação" | "alimentacao" => Category::Food,
            "transport" | "transporte" => Category::Transport,
            "entertainment" | "entretenimento" => Category::Entertainment,
            "health" | "saúde" | "saude" => Category::Health,
            "education" | "educação" | "educacao" => Category::Education,
            "home" | "casa" => Category::Home,
            "clothing" | "roupas" => Category::Clothing,
            "technology" | "tecnologia" => Category::Technology,
            "income" | "receita" | "salary" | "salário" | "salario" => Category::Income,
            "other" | "outros" => Category::Other,
            _ => {
                return Err(LedgerError::InvalidRecord {
                    id: s.to_string(),
                    reason: "unknown category".to_string(),
                })
            }
        };
        Ok(category)
    }
}

impl TryFrom<String> for Category {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// TESTS
// ============================================================================
