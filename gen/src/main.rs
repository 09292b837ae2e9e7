use std::env::args;
use std::io::{BufWriter, Write};
use std::process::exit;

fn usage() -> ! {
    println!("Usage: gen grid | gen records <count>");
    exit(1);
}

fn main() {
    let stdlock = std::io::stdout().lock();
    let mut bufout = BufWriter::new(stdlock);

    match &args().collect::<Vec<_>>()[..] {
        [_, cmd] if cmd == "grid" => {
            serde_json::to_writer_pretty(&mut bufout, &gen::grid()).unwrap();
            writeln!(bufout).unwrap();
        }
        [_, cmd, count_str, ..] if cmd == "records" => {
            let count: usize = count_str.parse().expect("invalid count");
            writeln!(bufout, "{{\"total_rows\":{count},\"offset\":0,\"rows\":[").unwrap();
            let mut records = gen::gen(count).peekable();
            while let Some(record) = records.next() {
                // the last record closes the array on its own line
                let sep = if records.peek().is_some() { "," } else { "]}" };
                writeln!(bufout, "{record}{sep}").unwrap();
            }
            if count == 0 {
                writeln!(bufout, "]}}").unwrap();
            }
        }
        _ => usage(),
    }
}
