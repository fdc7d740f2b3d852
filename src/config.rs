//! CLI configuration for the demonstration binary (`main.rs`). Not part of
//! the library's public surface — the façades in this crate are built,
//! queried and serialised directly by callers; no behavior here is
//! specified or constrained by the CLI.

/// Configuration parsed from command-line arguments.
pub struct Config {
    /// Which façade to exercise: one of `dps`, `dbs`, `ds64`, `dwt`, `dp`, `drr`.
    pub index_name: String,
    /// Name of the file holding newline-separated input values.
    pub file_in: String,
    /// Name of the file to write the serialised structure to.
    pub file_out: String,
}

const INDEX_NAMES: [&str; 6] = ["dps", "dbs", "ds64", "dwt", "dp", "drr"];

impl Config {
    /// Build a `Config` from `args` (as passed to `main`, including the
    /// binary name at index 0): `<index_name> <input_file> <output_file>`.
    pub fn new(args: &[String]) -> Result<Self, &'static str> {
        if args.len() <= 3 {
            return Err("usage: <index_name> <input_file> <output_file>, index_name one of dps/dbs/ds64/dwt/dp/drr");
        }

        let index_name = args[1].clone();
        if !INDEX_NAMES.contains(&index_name.as_str()) {
            return Err("index_name must be one of dps, dbs, ds64, dwt, dp, drr");
        }

        let file_in = args[2].clone();
        let file_out = args[3].clone();

        Ok(Config {
            index_name,
            file_in,
            file_out,
        })
    }
}
