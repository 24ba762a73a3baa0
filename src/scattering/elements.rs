/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Element symbols and atomic numbers
//!
//! Species labels in structure files often carry oxidation states or site
//! labels (`Fe2+`, `O1`); [`element_of`] reduces them to the bare symbol.

/// Element symbols indexed by atomic number minus one
const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Provides element symbols for atomic numbers
pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    let index = (atomic_number as usize).checked_sub(1)?;
    ELEMENT_SYMBOLS.get(index).copied()
}

/// Atomic number of an element symbol (case-sensitive, e.g. `"Fe"`)
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ELEMENT_SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|index| index as u32 + 1)
}

/// Leading element symbol of a species label
///
/// Takes one uppercase letter followed by any lowercase letters, so `Fe2+`,
/// `Fe1` and `Fe` all give `Fe`. Returns `None` if the label does not start
/// with an uppercase letter or names no element.
pub fn element_of(label: &str) -> Option<&'static str> {
    let mut chars = label.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_uppercase() => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !c.is_ascii_lowercase())
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    let z = atomic_number(&label[..end])?;
    element_symbol(z)
}
