/// TTL applied when a caller does not supply one.
pub const DEFAULT_TTL: u32 = 3600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub default_ttl: u32,
    pub default_nameservers: Vec<String>, // "ns1.example.net.", ...
    pub rename_strategy: RenameStrategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            default_nameservers: Vec::new(),
            rename_strategy: RenameStrategy::default(),
        }
    }
}

/// How a record rename is sent to PowerDNS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RenameStrategy {
    /// DELETE of the old name and REPLACE of the new name in one PATCH.
    #[default]
    Batched,
    /// DELETE, then REPLACE, as two PATCH calls. A failure of the second call
    /// leaves the record deleted.
    TwoPhase,
}
