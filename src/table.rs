use pad::PadStr;

pub struct Table {
    ncol: usize,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn with_capacity(size: usize) -> Table {
        Table {
            ncol: 0,
            rows: Vec::with_capacity(size),
        }
    }

    pub fn add(&mut self, row: Vec<String>) {
        if self.ncol == 0 {
            self.ncol = row.len();
        }
        debug_assert_eq!(row.len(), self.ncol, "unexpected row len");
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut pads = vec![0; self.ncol];
        for row in self.rows.iter() {
            for (coli, cell) in row.iter().enumerate().take(self.ncol) {
                let size = console::measure_text_width(cell);
                if size > pads[coli] {
                    pads[coli] = size;
                }
            }
        }

        let mut split = String::from("+");
        for pad in pads.iter() {
            for _ in 0..*pad + 2 {
                split.push('-');
            }
            split.push('+');
        }

        let mut out = String::new();
        for (rowi, row) in self.rows.iter().enumerate() {
            if rowi == 0 {
                out.push_str(&split);
                out.push('\n');
            }
            out.push('|');
            for (coli, pad) in pads.iter().enumerate() {
                let cell = row.get(coli).map(String::as_str).unwrap_or("");
                let text = cell.pad_to_width_with_alignment(*pad, pad::Alignment::Left);
                out.push_str(&format!(" {text} |"));
            }
            out.push('\n');

            if rowi == 0 {
                out.push_str(&split);
                out.push('\n');
            }
        }
        out.push_str(&split);
        out
    }

    pub fn show(self) {
        println!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut table = Table::with_capacity(2);
        table.add(vec!["ID".to_string(), "TITLE".to_string()]);
        table.add(vec!["1".to_string(), "Task 1".to_string()]);

        let expect = "+----+--------+\n\
                      | ID | TITLE  |\n\
                      +----+--------+\n\
                      | 1  | Task 1 |\n\
                      +----+--------+";
        assert_eq!(table.render(), expect);
    }
}
