//! Table schema registry.
//!
//! Static, code-defined metadata for every table the generic list/form flow can
//! touch: field labels, kinds, requiredness, form visibility and foreign-key
//! targets. The registry is the single source of truth for which identifiers
//! may ever appear in generated SQL — user input selects a table *through* the
//! registry, never names one directly.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Field kind. A closed sum so the renderers can match exhaustively instead of
/// branching on a string tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Password,
    ForeignKey(ForeignKeySpec),
}

/// Foreign-key target description. The stored value is the target's key
/// column; the rendered value is the target's display column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub table: &'static str,
    /// Key column on the target table; defaults to the target's primary key.
    pub key_column: Option<&'static str>,
    pub display_column: &'static str,
}

impl ForeignKeySpec {
    /// Resolve the key column, falling back to the target table's primary key.
    pub fn resolved_key_column(&self) -> Option<&'static str> {
        match self.key_column {
            Some(col) => Some(col),
            None => registry().get(self.table).and_then(TableSchema::resolve_key),
        }
    }

    /// Scalar kind of the key value this field stores.
    pub fn key_scalar_kind(&self) -> ScalarKind {
        let target = match registry().get(self.table) {
            Some(t) => t,
            None => return ScalarKind::Text,
        };
        self.resolved_key_column()
            .and_then(|col| target.fields.get(col))
            .map_or(ScalarKind::Text, |f| f.kind.scalar_kind())
    }
}

/// The runtime representation a field binds and decodes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Int,
    Bool,
    Timestamp,
}

impl FieldKind {
    pub fn scalar_kind(&self) -> ScalarKind {
        match self {
            FieldKind::Text | FieldKind::Password => ScalarKind::Text,
            FieldKind::Number => ScalarKind::Int,
            FieldKind::Boolean => ScalarKind::Bool,
            FieldKind::Date => ScalarKind::Timestamp,
            FieldKind::ForeignKey(fk) => fk.key_scalar_kind(),
        }
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKeySpec> {
        match self {
            FieldKind::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub show_in_form: bool,
}

/// Primary key declaration. Composite keys exist in the data model but are
/// rejected by the generic list/form flow, which assumes a single scalar key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    Single(&'static str),
    Composite(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub primary_key: Option<PrimaryKey>,
    pub fields: IndexMap<&'static str, FieldSpec>,
}

impl TableSchema {
    /// Resolve the single-column primary key usable by the generic flow.
    ///
    /// Declared single keys win; when no key is declared the first field whose
    /// name ends in `_cod` is taken. Composite keys resolve to `None` — the
    /// caller treats that as "not configured".
    pub fn resolve_key(&self) -> Option<&'static str> {
        match &self.primary_key {
            Some(PrimaryKey::Single(col)) => Some(col),
            Some(PrimaryKey::Composite(_)) => None,
            None => self
                .fields
                .keys()
                .copied()
                .find(|name| name.to_lowercase().ends_with("_cod")),
        }
    }

    /// Scalar kind of the resolved primary key.
    pub fn key_scalar_kind(&self) -> Option<ScalarKind> {
        let key = self.resolve_key()?;
        self.fields.get(key).map(|f| f.kind.scalar_kind())
    }

    /// Foreign-key fields in declaration order.
    pub fn foreign_key_fields(&self) -> impl Iterator<Item = (&'static str, &ForeignKeySpec)> {
        self.fields
            .iter()
            .filter_map(|(name, spec)| spec.kind.as_foreign_key().map(|fk| (*name, fk)))
    }
}

#[derive(Debug)]
pub struct SchemaRegistry {
    tables: IndexMap<&'static str, TableSchema>,
}

impl SchemaRegistry {
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}

/// Global registry instance.
pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

fn field(label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        label,
        kind,
        required: false,
        show_in_form: true,
    }
}

fn required(label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        required: true,
        ..field(label, kind)
    }
}

fn hidden(label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        show_in_form: false,
        ..field(label, kind)
    }
}

fn fk(table: &'static str, display_column: &'static str) -> FieldKind {
    FieldKind::ForeignKey(ForeignKeySpec {
        table,
        key_column: None,
        display_column,
    })
}

fn fk_on(
    table: &'static str,
    key_column: &'static str,
    display_column: &'static str,
) -> FieldKind {
    FieldKind::ForeignKey(ForeignKeySpec {
        table,
        key_column: Some(key_column),
        display_column,
    })
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    let mut tables = IndexMap::new();

    tables.insert(
        "autor",
        TableSchema {
            name: "autor",
            label: "Autor",
            primary_key: Some(PrimaryKey::Single("au_cod")),
            fields: IndexMap::from([
                ("au_cod", hidden("Código", FieldKind::Number)),
                ("au_nome", required("Nome", FieldKind::Text)),
                ("au_pais", field("País", fk("pais", "pa_pais"))),
            ]),
        },
    );

    tables.insert(
        "codigo_postal",
        TableSchema {
            name: "codigo_postal",
            label: "Código Postal",
            primary_key: Some(PrimaryKey::Single("cod_postal")),
            fields: IndexMap::from([
                ("cod_postal", required("Código Postal", FieldKind::Text)),
                ("cod_localidade", required("Localidade", FieldKind::Text)),
            ]),
        },
    );

    tables.insert(
        "edicao",
        TableSchema {
            name: "edicao",
            label: "Edição",
            primary_key: Some(PrimaryKey::Single("edc_edicao")),
            fields: IndexMap::from([("edc_edicao", required("Edição", FieldKind::Text))]),
        },
    );

    tables.insert(
        "editora",
        TableSchema {
            name: "editora",
            label: "Editora",
            primary_key: Some(PrimaryKey::Single("ed_cod")),
            fields: IndexMap::from([
                ("ed_cod", hidden("Código", FieldKind::Number)),
                ("ed_nome", required("Nome", FieldKind::Text)),
                ("ed_pais", field("País", fk("pais", "pa_pais"))),
                ("ed_morada", field("Morada", FieldKind::Text)),
                (
                    "ed_cod_postal",
                    field("Código Postal", fk("codigo_postal", "cod_postal")),
                ),
                ("ed_email", field("Email", FieldKind::Text)),
                ("ed_tlm", field("Telemóvel", FieldKind::Text)),
            ]),
        },
    );

    tables.insert(
        "genero",
        TableSchema {
            name: "genero",
            label: "Género",
            primary_key: Some(PrimaryKey::Single("ge_genero")),
            fields: IndexMap::from([("ge_genero", required("Género", FieldKind::Text))]),
        },
    );

    tables.insert(
        "livro",
        TableSchema {
            name: "livro",
            label: "Livro",
            primary_key: Some(PrimaryKey::Single("li_cod")),
            fields: IndexMap::from([
                ("li_cod", hidden("Código", FieldKind::Number)),
                ("li_titulo", required("Título", FieldKind::Text)),
                ("li_ano", field("Ano", FieldKind::Number)),
                ("li_edicao", field("Edição", fk("edicao", "edc_edicao"))),
                ("li_isbn", field("ISBN", FieldKind::Text)),
                (
                    "li_editora",
                    field("Editora", fk_on("editora", "ed_cod", "ed_nome")),
                ),
                ("li_genero", field("Género", fk("genero", "ge_genero"))),
            ]),
        },
    );

    tables.insert(
        "livro_autor",
        TableSchema {
            name: "livro_autor",
            label: "Autores do Livro",
            primary_key: Some(PrimaryKey::Composite(&["li_au_livro", "li_au_autor"])),
            fields: IndexMap::from([
                (
                    "li_au_livro",
                    field("Livro", fk_on("livro", "li_cod", "li_titulo")),
                ),
                (
                    "li_au_autor",
                    field("Autor", fk_on("autor", "au_cod", "au_nome")),
                ),
            ]),
        },
    );

    tables.insert(
        "livro_exemplar",
        TableSchema {
            name: "livro_exemplar",
            label: "Exemplar",
            primary_key: Some(PrimaryKey::Single("lex_cod")),
            fields: IndexMap::from([
                ("lex_cod", hidden("Código", FieldKind::Number)),
                (
                    "lex_li_cod",
                    field("Livro", fk_on("livro", "li_cod", "li_titulo")),
                ),
                ("lex_estado", field("Estado", FieldKind::Text)),
                ("lex_disponivel", field("Disponível", FieldKind::Boolean)),
                ("lex_requisitavel", field("Requisitável", FieldKind::Boolean)),
            ]),
        },
    );

    tables.insert(
        "pais",
        TableSchema {
            name: "pais",
            label: "País",
            primary_key: Some(PrimaryKey::Single("pa_pais")),
            fields: IndexMap::from([("pa_pais", required("País", FieldKind::Text))]),
        },
    );

    tables.insert(
        "requisicao",
        TableSchema {
            name: "requisicao",
            label: "Requisição",
            primary_key: Some(PrimaryKey::Single("re_cod")),
            fields: IndexMap::from([
                ("re_cod", hidden("Código", FieldKind::Number)),
                (
                    "re_ut_cod",
                    field("Utente", fk_on("utente", "ut_cod", "ut_nome")),
                ),
                (
                    "re_lex_cod",
                    field("Exemplar", fk_on("livro_exemplar", "lex_cod", "lex_cod")),
                ),
                (
                    "re_data_requisicao",
                    required("Data de Requisição", FieldKind::Date),
                ),
                (
                    "re_data_devolucao",
                    hidden("Data de Devolução", FieldKind::Date),
                ),
                ("re_emprestado", field("Emprestado", FieldKind::Boolean)),
            ]),
        },
    );

    tables.insert(
        "utente",
        TableSchema {
            name: "utente",
            label: "Utente",
            primary_key: Some(PrimaryKey::Single("ut_cod")),
            fields: IndexMap::from([
                ("ut_cod", hidden("Código", FieldKind::Number)),
                ("ut_nome", required("Nome", FieldKind::Text)),
                ("ut_nif", field("NIF", FieldKind::Text)),
                ("ut_email", field("Email", FieldKind::Text)),
                ("ut_tlm", field("Telemóvel", FieldKind::Text)),
                ("ut_morada", field("Morada", FieldKind::Text)),
                (
                    "ut_cod_postal",
                    field("Código Postal", fk("codigo_postal", "cod_postal")),
                ),
                ("ut_password", field("Password", FieldKind::Password)),
            ]),
        },
    );

    SchemaRegistry { tables }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_table_is_absent() {
        assert!(registry().get("inventario").is_none());
    }

    #[test]
    fn declared_single_key_resolves() {
        let livro = registry().get("livro").unwrap();
        assert_eq!(livro.resolve_key(), Some("li_cod"));
        assert_eq!(livro.key_scalar_kind(), Some(ScalarKind::Int));
    }

    #[test]
    fn composite_key_is_excluded_from_generic_flow() {
        let junction = registry().get("livro_autor").unwrap();
        assert_eq!(junction.resolve_key(), None);
    }

    #[test]
    fn key_suffix_heuristic_applies_when_no_key_declared() {
        let schema = TableSchema {
            name: "emprestimo",
            label: "Empréstimo",
            primary_key: None,
            fields: IndexMap::from([
                ("em_nota", field("Nota", FieldKind::Text)),
                ("em_cod", field("Código", FieldKind::Number)),
            ]),
        };
        assert_eq!(schema.resolve_key(), Some("em_cod"));
    }

    #[test]
    fn foreign_key_defaults_to_target_primary_key() {
        let autor = registry().get("autor").unwrap();
        let (_, fk) = autor.foreign_key_fields().next().unwrap();
        assert_eq!(fk.table, "pais");
        assert_eq!(fk.resolved_key_column(), Some("pa_pais"));
        assert_eq!(fk.key_scalar_kind(), ScalarKind::Text);
    }

    #[test]
    fn numeric_foreign_key_resolves_int_kind() {
        let livro = registry().get("livro").unwrap();
        let editora = livro.fields.get("li_editora").unwrap();
        assert_eq!(editora.kind.scalar_kind(), ScalarKind::Int);
    }

    #[test]
    fn text_primary_keys_stay_text() {
        let genero = registry().get("genero").unwrap();
        assert_eq!(genero.key_scalar_kind(), Some(ScalarKind::Text));
    }

    #[test]
    fn field_order_follows_declaration() {
        let livro = registry().get("livro").unwrap();
        let first: Vec<_> = livro.fields.keys().take(3).copied().collect();
        assert_eq!(first, ["li_cod", "li_titulo", "li_ano"]);
    }
}
