use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::{json, Value};

/// Longitude of the grid's west edge.
pub const WEST: f64 = 144.7;
/// Latitude of the grid's north edge.
pub const NORTH: f64 = -37.5;
/// Cell edge length in degrees.
pub const STEP: f64 = 0.15;

/// Rows and the columns present in each.
const LAYOUT: [(char, &[u32]); 4] = [
    ('A', &[1, 2, 3, 4]),
    ('B', &[1, 2, 3, 4]),
    ('C', &[1, 2, 3, 4, 5]),
    ('D', &[3, 4, 5]),
];

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// A Melbourne-style boundary file: rows A-D north to south, columns 1-5 west to east.
pub fn grid() -> Value {
    let features: Vec<Value> = LAYOUT
        .iter()
        .enumerate()
        .flat_map(|(r, (row, columns))| {
            columns.iter().map(move |&c| {
                let xmin = round6(WEST + STEP * (c - 1) as f64);
                let xmax = round6(xmin + STEP);
                let ymax = round6(NORTH - STEP * r as f64);
                let ymin = round6(ymax - STEP);
                json!({
                    "type": "Feature",
                    "properties": {
                        "id": format!("{row}{c}"),
                        "xmin": xmin,
                        "xmax": xmax,
                        "ymin": ymin,
                        "ymax": ymax,
                    },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[
                            [xmin, ymax], [xmax, ymax], [xmax, ymin], [xmin, ymin], [xmin, ymax]
                        ]],
                    },
                })
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Records scattered around the grid centre. About one in ten carries no coordinates.
///
/// Coordinates are stored latitude first.
pub fn gen(count: usize) -> impl Iterator<Item = String> {
    let mut rng = rand::thread_rng();
    let lon = Normal::new(145.05, 0.25).expect("valid longitude spread");
    let lat = Normal::new(-37.8, 0.2).expect("valid latitude spread");

    (0..count).map(move |i| {
        let coordinates = if rng.gen_bool(0.1) {
            Value::Null
        } else {
            let (x, y) = (round6(lon.sample(&mut rng)), round6(lat.sample(&mut rng)));
            json!({ "type": "Point", "coordinates": [y, x] })
        };
        json!({
            "id": i.to_string(),
            "doc": { "_id": i.to_string(), "coordinates": coordinates },
        })
        .to_string()
    })
}
