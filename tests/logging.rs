use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use gridcount::{run, Cell, GridIndex, MemorySource, RunConfig, Strategy};

#[derive(Clone)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Installs a process-wide subscriber, so this file holds a single test: the indexed
// workers log from rayon's pool threads.
#[test]
fn indexed_workers_log_their_scan_stats() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let writer = Capture(buf.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let cells = vec![
        Cell::new("A1", 0.0, 10.0, 0.0, 10.0),
        Cell::new("A2", 10.0, 20.0, 0.0, 10.0),
    ];
    let grid = GridIndex::new(cells, &"A1,A2,A1,A2".parse().unwrap()).unwrap();
    let input = b"header\n{\"doc\":{\"coordinates\":{\"coordinates\":[5,5]}}},\n{\"doc\":{}}]}\n";
    let config = RunConfig::default()
        .with_workers(2)
        .with_strategy(Strategy::Indexed);
    run(grid, &MemorySource(input), &config).unwrap();

    let logged = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    let finished: Vec<_> = logged.lines().filter(|l| l.contains("scan finished")).collect();
    assert_eq!(finished.len(), 2, "{logged}");
    assert!(finished.iter().all(|l| l.contains("counted")));
}
