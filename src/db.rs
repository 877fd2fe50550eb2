//! Database schema and operations
//!
//! An imported recipe table is stored as one `recipes` row per variant and
//! one `recipe_ingredients` row per filled slot.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Result};

use crate::models::{Ingredient, RecipeRow};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per recipe variant
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            output_item TEXT NOT NULL CHECK (output_item <> ''),
            yield_per_batch INTEGER NOT NULL CHECK (yield_per_batch > 0)
        );

        -- Filled ingredient slots only
        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            slot INTEGER NOT NULL,
            material TEXT NOT NULL,
            quantity REAL NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (recipe_id, slot)
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_output ON recipes(output_item);
        "#,
    )?;
    Ok(())
}

/// Open a database that must already exist, read-only
pub fn open_existing(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
}

/// Insert one recipe variant with its ingredients
pub fn insert_recipe(conn: &Connection, row: &RecipeRow) -> Result<i64> {
    conn.execute(
        "INSERT INTO recipes (output_item, yield_per_batch) VALUES (?1, ?2)",
        (&row.output_item, row.yield_per_batch),
    )?;
    let recipe_id = conn.last_insert_rowid();

    for (slot, ingredient) in row.ingredients.iter().enumerate() {
        conn.execute(
            "INSERT INTO recipe_ingredients (recipe_id, slot, material, quantity)
             VALUES (?1, ?2, ?3, ?4)",
            (recipe_id, slot + 1, &ingredient.material, ingredient.quantity),
        )?;
    }

    Ok(recipe_id)
}

/// Insert many recipes in a single transaction
pub fn insert_recipes(conn: &mut Connection, rows: &[RecipeRow]) -> Result<usize> {
    let tx = conn.transaction()?;
    for row in rows {
        insert_recipe(&tx, row)?;
    }
    tx.commit()?;
    Ok(rows.len())
}

/// Clear all stored recipes (for re-import)
pub fn clear_recipes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_ingredients;
        DELETE FROM recipes;
        "#,
    )?;
    Ok(())
}

/// Load every recipe variant in insertion order, ingredients in slot order
pub fn load_rows(conn: &Connection) -> Result<Vec<RecipeRow>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.output_item, r.yield_per_batch, ri.material, ri.quantity
         FROM recipes r
         LEFT JOIN recipe_ingredients ri ON ri.recipe_id = r.id
         ORDER BY r.id, ri.slot",
    )?;

    let records = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u32>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<f64>>(4)?,
        ))
    })?;

    let mut results: Vec<RecipeRow> = Vec::new();
    let mut current_id = None;
    for record in records {
        let (id, output_item, yield_per_batch, material, quantity) = record?;
        if current_id != Some(id) {
            current_id = Some(id);
            results.push(RecipeRow::new(output_item, yield_per_batch, Vec::new()));
        }
        if let (Some(material), Some(quantity)) = (material, quantity) {
            if let Some(row) = results.last_mut() {
                row.ingredients.push(Ingredient::new(material, quantity));
            }
        }
    }
    Ok(results)
}

/// List all distinct craftable items
pub fn list_craftable_items(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT output_item FROM recipes ORDER BY output_item")?;

    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
