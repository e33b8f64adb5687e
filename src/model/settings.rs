use serde::{Deserialize, Serialize};

/// Process-wide application settings, replaced wholesale by the settings form.
///
/// `initial_kas_balance` is the starting balance the kas ledger is summed on
/// top of. The two text fields customize the login screen.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub login_title: String,
    pub login_description: String,
    #[serde(default)]
    pub initial_kas_balance: i64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            login_title: "E-Kas & Tabungan".to_string(),
            login_description: "Sistem manajemen keuangan kelas terintegrasi Cloud.".to_string(),
            initial_kas_balance: 0,
        }
    }
}
