// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// pairdist - Pairwise evolutionary distances for aligned sequences
pub struct Args {
    /// path to aligned sequences in FASTA format
    #[argh(option)]
    pub alignment: Option<String>,

    /// distance calculator: hamming, jc69, tn93, logdet, paralinear (default: tn93)
    #[argh(option, default = "String::from(\"tn93\")")]
    pub calculator: String,

    /// molecule type: dna, rna, protein, text (default: calculator's default)
    #[argh(option)]
    pub moltype: Option<String>,

    /// disable the Tamura-Kumar adjustment (logdet only)
    #[argh(switch)]
    pub no_tk_adjustment: bool,

    /// state index marking gaps and ambiguous characters, must be negative (default: -9)
    #[argh(option, default = "-9")]
    pub invalid: i8,

    /// output matrix file
    #[argh(option)]
    pub output: Option<String>,

    /// statistic to write: dist, stderr, var, proportion, length (default: dist)
    #[argh(option, default = "String::from(\"dist\")")]
    pub statistic: String,

    /// output format: tsv, csv, phylip, nexus (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub format: String,

    /// decimal places in the output matrix (default: 4)
    #[argh(option, default = "4")]
    pub digits: usize,

    /// write only unique sequences instead of expanding duplicates
    #[argh(switch)]
    pub exclude_duplicates: bool,

    /// drop every sequence with an invalid distance (required for tree building)
    #[argh(switch)]
    pub drop_invalid: bool,

    /// write duplicate groups to this TSV file
    #[argh(option)]
    pub duplicates_report: Option<String>,

    /// write per-pair statistics and duplicates to this JSON file
    #[argh(option)]
    pub json_report: Option<String>,

    /// include only sequences whose name matches this regex
    #[argh(option)]
    pub include_seqs: Option<String>,

    /// exclude sequences whose name matches this regex
    #[argh(option)]
    pub exclude_seqs: Option<String>,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// hide the progress bar
    #[argh(switch)]
    pub quiet: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// list available calculators and exit
    #[argh(switch)]
    pub list_calculators: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
