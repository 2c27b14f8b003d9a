//! A [View] writing to stdout, one line per change.

use printer_console::{AddressField, Badge, CatalogRow, Indicator, StatusReadout, View};

#[derive(Default)]
pub struct TerminalView;

impl View for TerminalView {
    fn indicator(&self, indicator: &Indicator) {
        match indicator.render() {
            Some(line) if indicator.failed => println!("[!] {}", line),
            Some(line) => println!("[~] {}", line),
            None => println!("[~] done"),
        }
    }

    fn catalog(&self, rows: &[CatalogRow]) {
        if rows.is_empty() {
            println!("(no files)");
        }
        for row in rows {
            let marker = if row.selected { '>' } else { ' ' };
            println!("{} {:<40} {:>12}", marker, row.name, row.size);
        }
    }

    fn catalog_failed(&self, message: &str) {
        println!("{}", message);
    }

    fn status(&self, readout: &StatusReadout) {
        match &readout.layers {
            Some(layers) => println!("status: {} {} (layer {})", readout.text, readout.progress, layers),
            None => println!("status: {} {}", readout.text, readout.progress),
        }
    }

    fn status_failed(&self, message: &str) {
        println!("status: {}", message);
    }

    fn badge(&self, badge: Badge) {
        println!("printer: {}", badge);
    }

    fn address(&self, field: &AddressField) {
        let state = if field.is_editable() { " (editing)" } else { "" };
        println!("printer ip: {}{}", field.value(), state);
    }

    fn notify(&self, message: &str) {
        println!("* {}", message);
    }
}
