//! Drug table operations.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{Database, DbResult, DrugFilter};
use crate::models::Drug;

const DRUG_COLUMNS: &str = r#"
    id, name, generic_name, active_ingredient, manufacturer,
    description, dosage, contraindications, warnings, farad_info,
    withdrawal_time, product_code, establishment_code, subsidiaries,
    trade_name, distributors, species, delivery_methods, created_at
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO drugs (
    id, name, generic_name, active_ingredient, manufacturer,
    description, dosage, contraindications, warnings, farad_info,
    withdrawal_time, product_code, establishment_code, subsidiaries,
    trade_name, distributors, species, delivery_methods, created_at,
    updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
          ?15, ?16, ?17, ?18, ?19, datetime('now'))
ON CONFLICT(id) DO UPDATE SET
    name = excluded.name,
    generic_name = excluded.generic_name,
    active_ingredient = excluded.active_ingredient,
    manufacturer = excluded.manufacturer,
    description = excluded.description,
    dosage = excluded.dosage,
    contraindications = excluded.contraindications,
    warnings = excluded.warnings,
    farad_info = excluded.farad_info,
    withdrawal_time = excluded.withdrawal_time,
    product_code = excluded.product_code,
    establishment_code = excluded.establishment_code,
    subsidiaries = excluded.subsidiaries,
    trade_name = excluded.trade_name,
    distributors = excluded.distributors,
    species = excluded.species,
    delivery_methods = excluded.delivery_methods,
    updated_at = datetime('now')
"#;

impl Database {
    /// Insert or update a drug record. `created_at` is kept on update.
    pub fn upsert_drug(&self, drug: &Drug) -> DbResult<()> {
        write_drug(&self.conn, drug)
    }

    /// Upsert a batch in one transaction. Returns the number written.
    pub fn upsert_drugs(&mut self, drugs: &[Drug]) -> DbResult<usize> {
        let tx = self.transaction()?;
        for drug in drugs {
            write_drug(&tx, drug)?;
        }
        tx.commit()?;
        Ok(drugs.len())
    }

    /// Get a drug by id.
    pub fn get_drug(&self, id: &str) -> DbResult<Option<Drug>> {
        let sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE id = ?");
        let drug = self
            .conn
            .query_row(&sql, [id], map_drug_row)
            .optional()?;
        Ok(drug)
    }

    /// Delete a drug. Returns whether a row was removed.
    pub fn delete_drug(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM drugs WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Number of stored drugs.
    pub fn count_drugs(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM drugs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recently created drugs, newest first.
    pub fn list_recent_drugs(&self, limit: usize) -> DbResult<Vec<Drug>> {
        self.search_drugs(&DrugFilter::All(Vec::new()), limit)
    }

    /// Drugs matching a filter, newest first.
    pub fn search_drugs(&self, filter: &DrugFilter, limit: usize) -> DbResult<Vec<Drug>> {
        let mut params = Vec::new();
        let predicate = filter.to_sql(&mut params);
        let sql = format!(
            "SELECT {DRUG_COLUMNS} FROM drugs WHERE {predicate} \
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), map_drug_row)?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?);
        }
        Ok(drugs)
    }
}

fn write_drug(conn: &Connection, drug: &Drug) -> DbResult<()> {
    conn.execute(
        UPSERT_SQL,
        params![
            drug.id,
            drug.name,
            drug.generic_name,
            drug.active_ingredient,
            drug.manufacturer,
            drug.description,
            drug.dosage,
            drug.contraindications,
            drug.warnings,
            drug.farad_info,
            drug.withdrawal_time,
            drug.product_code,
            drug.establishment_code,
            drug.subsidiaries,
            drug.trade_name,
            drug.distributors,
            drug.species,
            drug.delivery_methods,
            drug.created_at,
        ],
    )?;
    Ok(())
}

fn map_drug_row(row: &Row<'_>) -> rusqlite::Result<Drug> {
    Ok(Drug {
        id: row.get(0)?,
        name: row.get(1)?,
        generic_name: row.get(2)?,
        active_ingredient: row.get(3)?,
        manufacturer: row.get(4)?,
        description: row.get(5)?,
        dosage: row.get(6)?,
        contraindications: row.get(7)?,
        warnings: row.get(8)?,
        farad_info: row.get(9)?,
        withdrawal_time: row.get(10)?,
        product_code: row.get(11)?,
        establishment_code: row.get(12)?,
        subsidiaries: row.get(13)?,
        trade_name: row.get(14)?,
        distributors: row.get(15)?,
        species: row.get(16)?,
        delivery_methods: row.get(17)?,
        created_at: row.get(18)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrugField, Species};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn drug(name: &str, created_at: &str) -> Drug {
        let mut d = Drug::new(name.into(), "ingredient".into(), "Acme".into());
        d.created_at = created_at.into();
        d
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut d = drug("Rimadyl", "2024-01-01T00:00:00Z");
        d.trade_name = Some("Rimadyl Caplets".into());
        d.set_species(&[Species::Canine]);
        d.set_delivery_methods(&["ORAL"]);
        db.upsert_drug(&d).unwrap();

        let retrieved = db.get_drug(&d.id).unwrap().unwrap();
        assert_eq!(retrieved, d);
    }

    #[test]
    fn test_upsert_updates_and_keeps_created_at() {
        let db = setup_db();

        let mut d = drug("Original", "2024-01-01T00:00:00Z");
        db.upsert_drug(&d).unwrap();

        d.name = "Updated".into();
        d.created_at = "2030-01-01T00:00:00Z".into();
        db.upsert_drug(&d).unwrap();

        let retrieved = db.get_drug(&d.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Updated");
        assert_eq!(retrieved.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(db.count_drugs().unwrap(), 1);
    }

    #[test]
    fn test_upsert_batch() {
        let mut db = setup_db();
        let batch = vec![
            drug("A", "2024-01-01T00:00:00Z"),
            drug("B", "2024-01-02T00:00:00Z"),
        ];

        assert_eq!(db.upsert_drugs(&batch).unwrap(), 2);
        assert_eq!(db.upsert_drugs(&batch).unwrap(), 2);
        assert_eq!(db.count_drugs().unwrap(), 2);
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_drug("nope").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let db = setup_db();
        let d = drug("Rimadyl", "2024-01-01T00:00:00Z");
        db.upsert_drug(&d).unwrap();

        assert!(db.delete_drug(&d.id).unwrap());
        assert!(!db.delete_drug(&d.id).unwrap());
        assert_eq!(db.count_drugs().unwrap(), 0);
    }

    #[test]
    fn test_recent_ordering_and_limit() {
        let db = setup_db();
        db.upsert_drug(&drug("Old", "2024-01-01T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("New", "2024-03-01T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("Mid", "2024-02-01T00:00:00Z")).unwrap();

        let names: Vec<String> = db
            .list_recent_drugs(2)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["New", "Mid"]);
    }

    #[test]
    fn test_same_timestamp_breaks_ties_by_insertion() {
        let db = setup_db();
        db.upsert_drug(&drug("First", "2024-01-01T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("Second", "2024-01-01T00:00:00Z")).unwrap();

        let recent = db.list_recent_drugs(10).unwrap();
        assert_eq!(recent[0].name, "Second");
    }

    #[test]
    fn test_search_with_filter() {
        let db = setup_db();

        let mut carprofen = drug("Rimadyl", "2024-01-01T00:00:00Z");
        carprofen.active_ingredient = "Carprofen".into();
        carprofen.set_species(&[Species::Canine]);
        db.upsert_drug(&carprofen).unwrap();

        let mut meloxicam = drug("Metacam", "2024-01-02T00:00:00Z");
        meloxicam.active_ingredient = "Meloxicam".into();
        meloxicam.set_species(&[Species::Canine, Species::Feline]);
        db.upsert_drug(&meloxicam).unwrap();

        // Case-insensitive substring
        let filter = DrugFilter::FieldContains(DrugField::ActiveIngredient, "carpro".into());
        let results = db.search_drugs(&filter, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Rimadyl");

        // Species code
        let filter = DrugFilter::SpeciesContains(Species::Feline);
        let results = db.search_drugs(&filter, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Metacam");

        // Any across fields
        let filter = DrugFilter::Any(vec![
            DrugFilter::FieldContains(DrugField::Name, "metacam".into()),
            DrugFilter::FieldContains(DrugField::Name, "rimadyl".into()),
        ]);
        assert_eq!(db.search_drugs(&filter, 10).unwrap().len(), 2);

        // Null fields never match
        let filter = DrugFilter::FieldContains(DrugField::Warnings, "a".into());
        assert!(db.search_drugs(&filter, 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let db = setup_db();
        db.upsert_drug(&drug("Plain", "2024-01-01T00:00:00Z")).unwrap();

        let filter = DrugFilter::FieldContains(DrugField::Name, "%".into());
        assert!(db.search_drugs(&filter, 10).unwrap().is_empty());
    }
}
