use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use seqbias::bam::{self, CountResult};
use seqbias::cli::opts::{CountReadsArgs, FitArgs, PredictArgs};
use seqbias::cli::{Cli, Command};
use seqbias::fasta::FastaReference;
use seqbias::model;
use seqbias::postable::Strand;
use seqbias::predict;
use seqbias::train::{self, FitParams};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => run_fit(args),
        Command::Predict(args) => run_predict(args),
        Command::CountReads(args) => run_count_reads(args),
    }
}

fn run_fit(args: FitArgs) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.set_message("fitting bias model");
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let params = FitParams {
        max_reads: args.max_reads,
        l: args.l,
        r: args.r,
        complexity_penalty: args.complexity_penalty,
        seed: args.seed,
    };
    let model = train::fit(args.ref_fasta, &args.bam, params).context("fitting model")?;
    pb.finish_with_message("done");

    model::save(&model, &args.output).context("saving model")?;
    println!("wrote model to {:?}", args.output);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let model = model::load(&args.ref_fasta, &args.model).context("loading model")?;
    let mut fasta = FastaReference::open(&args.ref_fasta).context("opening reference")?;
    let strand = args.strand.to_strand();
    let values = predict::predict(
        &model,
        &mut fasta,
        &args.seqname,
        args.start,
        args.end,
        strand,
    )
    .context("predicting bias")?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("creating output file")?,
        )),
        None => Box::new(std::io::stdout()),
    };
    for (i, bias) in values.iter().enumerate() {
        writeln!(out, "{}\t{}", args.start + i as i64, bias)?;
    }
    Ok(())
}

fn run_count_reads(args: CountReadsArgs) -> Result<()> {
    let strand = args.strand.map(|s| s.to_strand());

    let bias_vec = match (&args.model, &args.ref_fasta) {
        (Some(model_path), Some(ref_path)) => {
            let model = model::load(ref_path, model_path).context("loading model")?;
            let mut fasta = FastaReference::open(ref_path).context("opening reference")?;
            let strand_for_predict = strand.unwrap_or(Strand::Forward);
            let values = predict::predict(
                &model,
                &mut fasta,
                &args.seqname,
                args.start,
                args.end,
                strand_for_predict,
            )
            .context("predicting bias for correction")?;
            Some(values)
        }
        _ => None,
    };
    let bias_offset = args.start;

    let bias_at_one_based = bias_vec
        .as_ref()
        .map(|v| -> Box<dyn Fn(i64) -> f64> {
            let v = v.clone();
            let offset = bias_offset;
            Box::new(move |pos: i64| {
                let idx = (pos - offset) as usize;
                v.get(idx).copied().unwrap_or(1.0)
            })
        });

    let result = bam::count_reads(
        &args.bam,
        &args.seqname,
        args.start,
        args.end,
        strand,
        bias_at_one_based.as_deref(),
        args.binary,
        args.sum_counts,
    )
    .context("counting reads")?;

    match result {
        CountResult::Scalar(v) => println!("{v}"),
        CountResult::Vector(values) => {
            for (i, count) in values.iter().enumerate() {
                println!("{}\t{}", args.start + i as i64, count);
            }
        }
    }
    Ok(())
}
