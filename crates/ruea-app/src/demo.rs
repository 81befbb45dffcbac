//! Demo mode for the dashboard
//! Generates a synthetic registry, labelled as inconsistently as real
//! captured data, and serves it from memory

use std::time::Duration;

use ruea_core::Record;
use ruea_data::MemoryTransport;
use serde_json::{json, Value};

/// Corregimientos with some of their veredas
const PLACES: [(&str, &[&str]); 5] = [
    ("Santa Elena", &["El Plan", "Mazo", "Piedras Blancas", "El Placer", "Barro Blanco"]),
    ("San Cristóbal", &["La Palma", "El Uvito", "Pedregal Alto", "Boquerón"]),
    ("Altavista", &["El Corazón", "Buga Patio Bonito", "Aguas Frías"]),
    ("San Antonio de Prado", &["Montañita", "La Verde", "Yarumalito"]),
    ("San Sebastián de Palmitas", &["La Aldea", "Urquitá", "La Suiza"]),
];

const LINEAS: [&str; 7] = [
    "Café",
    "Flores",
    "Hortalizas",
    "Frutales",
    "Ganadería",
    "Especies menores",
    "Aguacate",
];

const ESCOLARIDAD: [&str; 5] = ["Primaria", "Secundaria", "Técnica", "Profesional", "Ninguna"];

/// Simulated network delay of the demo server
pub const DEMO_LATENCY: Duration = Duration::from_millis(120);

/// Deterministic pseudo-random value in `[0, 1)` for row `idx` and stream `salt`
fn noise(idx: usize, salt: f64) -> f64 {
    let x = ((idx as f64 + 1.0) * 12345.6789 + salt * 98.765).sin() * 43758.5453;
    x - x.floor()
}

fn pick<T: Copy>(items: &[T], idx: usize, salt: f64) -> T {
    let i = (noise(idx, salt) * items.len() as f64) as usize;
    items[i.min(items.len() - 1)]
}

/// The same place written the ways data entry tends to write it
fn corregimiento_label(name: &str, position: usize, idx: usize) -> String {
    match idx % 6 {
        0 => format!("{:02} - {}", position + 1, name),
        1 => format!("Corregimiento de {}", name),
        2 => name.to_uppercase(),
        3 => format!("{} ", name),
        _ => name.to_string(),
    }
}

fn vereda_label(name: &str, idx: usize) -> String {
    match idx % 5 {
        0 => format!("Vereda {}", name),
        1 => name.to_lowercase(),
        2 => format!("{:02} - {}", idx % 40, name),
        _ => name.to_string(),
    }
}

fn linea_label(name: &str, idx: usize) -> Value {
    match idx % 9 {
        0 => Value::Null,
        1 => Value::String(name.to_uppercase()),
        2 => Value::String(format!(" {}", name)),
        _ => Value::String(name.to_string()),
    }
}

/// One synthetic row
pub fn demo_row(idx: usize) -> Record {
    let position = (noise(idx, 1.0) * PLACES.len() as f64) as usize % PLACES.len();
    let (corregimiento, veredas) = PLACES[position];
    let vereda = pick(veredas, idx, 2.0);

    let row = json!({
        "documento": idx + 1,
        "cedula": format!("{}", 43_000_000 + (noise(idx, 3.0) * 9_000_000.0) as u64),
        "corregimiento": corregimiento_label(corregimiento, position, idx),
        "vereda": vereda_label(vereda, idx),
        "linea_productiva": linea_label(pick(&LINEAS, idx, 4.0), idx),
        "escolaridad": pick(&ESCOLARIDAD, idx, 5.0),
        "sexo": if noise(idx, 6.0) < 0.52 { "F" } else { "M" },
        "edad": 18 + (noise(idx, 7.0) * 62.0) as u64,
        "area_ha": ((noise(idx, 8.0) * 12.0) * 100.0).round() / 100.0,
        "asociado": noise(idx, 9.0) < 0.4,
    });

    match row {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

pub fn demo_rows(count: usize) -> Vec<Record> {
    (0..count).map(demo_row).collect()
}

/// In-memory server over `count` synthetic rows
pub fn demo_transport(count: usize, with_stats: bool) -> MemoryTransport {
    tracing::info!(rows = count, stats = with_stats, "Starting demo server");
    let transport = MemoryTransport::new(demo_rows(count)).with_latency(DEMO_LATENCY);
    if with_stats {
        transport
    } else {
        transport.without_stats()
    }
}
