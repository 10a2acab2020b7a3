use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Plum,
    Grapes,
    Watermelon,
    Bell,
    Bar,
    Seven,
    BigWin,
}

impl Symbol {
    pub const ALL: [Symbol; 10] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Plum,
        Symbol::Grapes,
        Symbol::Watermelon,
        Symbol::Bell,
        Symbol::Bar,
        Symbol::Seven,
        Symbol::BigWin,
    ];

    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(i as usize).copied()
    }

    pub fn to_index(self) -> u8 {
        match self {
            Symbol::Cherry => 0,
            Symbol::Lemon => 1,
            Symbol::Orange => 2,
            Symbol::Plum => 3,
            Symbol::Grapes => 4,
            Symbol::Watermelon => 5,
            Symbol::Bell => 6,
            Symbol::Bar => 7,
            Symbol::Seven => 8,
            Symbol::BigWin => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Lemon => "lemon",
            Symbol::Orange => "orange",
            Symbol::Plum => "plum",
            Symbol::Grapes => "grapes",
            Symbol::Watermelon => "watermelon",
            Symbol::Bell => "bell",
            Symbol::Bar => "bar",
            Symbol::Seven => "seven",
            Symbol::BigWin => "big_win",
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The symbols a machine draws its cells from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolSet(pub Vec<Symbol>);

impl SymbolSet {
    pub fn full() -> Self {
        Self(Symbol::ALL.to_vec())
    }

    /// Six-symbol strip used by the classic three-reel machine.
    pub fn classic() -> Self {
        Self(vec![
            Symbol::Cherry,
            Symbol::Lemon,
            Symbol::Grapes,
            Symbol::Bell,
            Symbol::Seven,
            Symbol::BigWin,
        ])
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.0.contains(&symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, sym) in Symbol::ALL.iter().enumerate() {
            assert_eq!(sym.to_index() as usize, i);
            assert_eq!(Symbol::from_index(i as u8), Some(*sym));
        }
        assert_eq!(Symbol::from_index(10), None);
    }

    #[test]
    fn test_name_matches_serde() {
        for sym in Symbol::ALL {
            let json = serde_json::to_string(&sym).unwrap();
            assert_eq!(json, format!("\"{}\"", sym.name()));
        }
    }
}
