//! Fiscal classification catalog
//!
//! Static registry of valid classification names per transaction kind,
//! following Mexican tax legislation (LISR). Each entry carries its default
//! deductibility percentage. Income classifications are always 0% since
//! income is never a deduction; expenses split into deductible (50/100%)
//! and explicitly non-deductible groups.
//!
//! Lookups never fail: unknown names degrade to 0% / invalid, because this
//! catalog backs user-facing dropdowns.

use crate::models::TransactionKind;

/// A single catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub kind: TransactionKind,
    /// Default deductibility percentage (0-100)
    pub percentage: i64,
    pub description: &'static str,
}

/// Classifications for income
pub const INCOME_CLASSIFICATIONS: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Honorarios Médicos (Art. 100 LISR)",
        kind: TransactionKind::Income,
        percentage: 0,
        description: "Honorarios por servicios médicos profesionales",
    },
    CatalogEntry {
        name: "Otros servicios profesionales",
        kind: TransactionKind::Income,
        percentage: 0,
        description: "Otros servicios profesionales distintos a honorarios médicos",
    },
    CatalogEntry {
        name: "Ingresos exentos",
        kind: TransactionKind::Income,
        percentage: 0,
        description: "Ingresos exentos de impuestos",
    },
];

/// Classifications for deductible expenses
pub const DEDUCTIBLE_EXPENSES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Material de curación",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Material médico y de curación necesario para la práctica profesional",
    },
    CatalogEntry {
        name: "Renta de consultorio",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Renta del local donde se ejerce la actividad profesional",
    },
    CatalogEntry {
        name: "Servicios profesionales - Asistente",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Servicios de asistente médico o personal de apoyo",
    },
    CatalogEntry {
        name: "Cuotas colegios médicos",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Cuotas de colegios médicos y asociaciones profesionales",
    },
    CatalogEntry {
        name: "Depreciación equipo médico",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Depreciación de equipos médicos e instrumentales",
    },
    CatalogEntry {
        name: "Papelería y artículos escritorio",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Material de oficina y papelería para el consultorio",
    },
    CatalogEntry {
        name: "Teléfono e internet",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Servicios de telefonía e internet necesarios para la actividad",
    },
    CatalogEntry {
        name: "Gasolina y peajes",
        kind: TransactionKind::Expense,
        percentage: 50,
        description: "Combustible y peajes (deducible al 50% con documentación)",
    },
    CatalogEntry {
        name: "Comidas con documentación",
        kind: TransactionKind::Expense,
        percentage: 50,
        description: "Comidas de trabajo con documentación completa (CFDI)",
    },
    CatalogEntry {
        name: "Seguros",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Primas de seguros relacionados con la actividad profesional",
    },
    CatalogEntry {
        name: "Capacitación y congresos",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Cursos, congresos y capacitación médica",
    },
    CatalogEntry {
        name: "Publicidad",
        kind: TransactionKind::Expense,
        percentage: 100,
        description: "Gastos de publicidad y promoción del consultorio",
    },
];

/// Classifications for non-deductible expenses
pub const NON_DEDUCTIBLE_EXPENSES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Gastos personales",
        kind: TransactionKind::Expense,
        percentage: 0,
        description: "Gastos de carácter personal no relacionados con la actividad profesional",
    },
    CatalogEntry {
        name: "Gastos sin CFDI",
        kind: TransactionKind::Expense,
        percentage: 0,
        description: "Gastos que no cuentan con Comprobante Fiscal Digital",
    },
    CatalogEntry {
        name: "Multas y recargos",
        kind: TransactionKind::Expense,
        percentage: 0,
        description: "Multas, recargos y sanciones fiscales",
    },
    CatalogEntry {
        name: "Ropa personal",
        kind: TransactionKind::Expense,
        percentage: 0,
        description: "Vestimenta personal no relacionada con la actividad profesional",
    },
];

/// All classifications valid for a transaction kind, in insertion order
pub fn classifications_for(kind: TransactionKind) -> impl Iterator<Item = &'static CatalogEntry> {
    let (first, second): (&[CatalogEntry], &[CatalogEntry]) = match kind {
        TransactionKind::Income => (INCOME_CLASSIFICATIONS, &[]),
        TransactionKind::Expense => (DEDUCTIBLE_EXPENSES, NON_DEDUCTIBLE_EXPENSES),
    };
    first.iter().chain(second.iter())
}

/// Classification names for a kind (dropdowns, advisor prompts)
pub fn names_for(kind: TransactionKind) -> Vec<&'static str> {
    classifications_for(kind).map(|entry| entry.name).collect()
}

/// Default deductibility percentage for a classification name
///
/// Returns 0 for unknown names.
pub fn default_percentage(name: &str) -> i64 {
    INCOME_CLASSIFICATIONS
        .iter()
        .chain(DEDUCTIBLE_EXPENSES.iter())
        .chain(NON_DEDUCTIBLE_EXPENSES.iter())
        .find(|entry| entry.name == name)
        .map(|entry| entry.percentage)
        .unwrap_or(0)
}

/// Whether a classification name is valid for a transaction kind
pub fn is_valid(name: &str, kind: TransactionKind) -> bool {
    classifications_for(kind).any(|entry| entry.name == name)
}
