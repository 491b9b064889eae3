use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target URL (e.g., http://localhost:8000)
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Number of voters to simulate
    #[arg(short, long, default_value_t = 100)]
    voters: usize,

    /// Number of concurrent requests
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Simulate every Nth voter casting a second vote (0 disables)
    #[arg(short, long, default_value_t = 4)]
    double_vote_every: usize,
}

#[derive(Deserialize, Debug)]
struct Voter {
    id: i32,
    // name: String,
}

#[derive(Serialize)]
struct LoginRequest {
    name: String,
    address: String,
}

#[derive(Serialize)]
struct CastVoteRequest {
    voter_id: i32,
    candidate_name: String,
}

#[derive(Deserialize, Debug)]
struct CastVoteResponse {
    outcome: String,
    #[allow(dead_code)]
    candidate_name: String,
}

#[derive(Deserialize, Debug)]
struct TallySnapshot {
    total_votes: i64,
}

struct Counters {
    recorded: AtomicUsize,
    already_voted: AtomicUsize,
    failures: AtomicUsize,
}

async fn run_voter_simulation(
    client: &Client,
    base_url: &str,
    voter_index: usize,
    candidates: &[String],
    double_vote: bool,
    counters: &Counters,
) -> Result<()> {
    // 1. Log in (find-or-create the voter record)
    let login_url = format!("{}/api/login", base_url);
    let voter: Voter = client
        .post(&login_url)
        .json(&LoginRequest {
            name: format!("LoadTestVoter_{}", voter_index),
            address: format!("Jl. Simulasi No. {}", voter_index),
        })
        .send()
        .await
        .context("Failed to send login request")?
        .error_for_status()
        .context("Login failed")?
        .json()
        .await
        .context("Failed to parse voter")?;

    // 2. Pick a candidate
    let candidate = {
        let mut rng = rand::thread_rng();
        candidates
            .choose(&mut rng)
            .context("No candidates available")?
            .clone()
    };

    // 3. Vote
    let vote_url = format!("{}/api/vote", base_url);
    let first: CastVoteResponse = client
        .post(&vote_url)
        .json(&CastVoteRequest {
            voter_id: voter.id,
            candidate_name: candidate.clone(),
        })
        .send()
        .await
        .context("Failed to send vote request")?
        .error_for_status()
        .context("Vote casting failed")?
        .json()
        .await
        .context("Failed to parse vote response")?;

    match first.outcome.as_str() {
        "recorded" => counters.recorded.fetch_add(1, Ordering::Relaxed),
        _ => counters.already_voted.fetch_add(1, Ordering::Relaxed),
    };

    // 4. Optionally try to vote again; the server must report already_voted
    if double_vote {
        let second_candidate = {
            let mut rng = rand::thread_rng();
            candidates
                .choose(&mut rng)
                .context("No candidates available")?
                .clone()
        };

        let second: CastVoteResponse = client
            .post(&vote_url)
            .json(&CastVoteRequest {
                voter_id: voter.id,
                candidate_name: second_candidate,
            })
            .send()
            .await
            .context("Failed to send second vote request")?
            .error_for_status()
            .context("Second vote casting failed")?
            .json()
            .await
            .context("Failed to parse second vote response")?;

        if second.outcome != "already_voted" {
            anyhow::bail!("second vote was not rejected: {:?}", second);
        }
        counters.already_voted.fetch_add(1, Ordering::Relaxed);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("🚀 Starting load test against {}", args.url);
    println!("👥 Voters: {}", args.voters);
    println!("⚡ Concurrency: {}", args.concurrency);

    let client = Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    // 1. Fetch the candidate roster once
    let candidates_url = format!("{}/api/candidates", args.url);
    let candidates: Vec<String> = client
        .get(&candidates_url)
        .send()
        .await
        .context("Failed to fetch candidates")?
        .json()
        .await
        .context("Failed to parse candidates")?;

    if candidates.is_empty() {
        anyhow::bail!("No candidates found on the server. Cannot vote.");
    }
    println!("📋 Found {} candidates", candidates.len());

    let candidates = Arc::new(candidates);
    let base_url = Arc::new(args.url.clone());
    let counters = Arc::new(Counters {
        recorded: AtomicUsize::new(0),
        already_voted: AtomicUsize::new(0),
        failures: AtomicUsize::new(0),
    });

    let pb = ProgressBar::new(args.voters as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let start_time = Instant::now();

    let results = stream::iter(0..args.voters)
        .map(|i| {
            let client = client.clone();
            let base_url = base_url.clone();
            let candidates = candidates.clone();
            let counters = counters.clone();
            let pb = pb.clone();
            let double_vote = args.double_vote_every > 0 && i % args.double_vote_every == 0;

            async move {
                let result =
                    run_voter_simulation(&client, &base_url, i, &candidates, double_vote, &counters)
                        .await;

                if let Err(e) = result {
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                    pb.set_message(format!("Errors: {} ({})", counters.failures.load(Ordering::Relaxed), e));
                } else {
                    pb.set_message(format!(
                        "Recorded: {}",
                        counters.recorded.load(Ordering::Relaxed)
                    ));
                }
                pb.inc(1);
            }
        })
        .buffer_unordered(args.concurrency)
        .collect::<Vec<()>>();

    results.await;

    pb.finish_with_message("Done");

    let duration = start_time.elapsed();
    let recorded = counters.recorded.load(Ordering::Relaxed);
    let already_voted = counters.already_voted.load(Ordering::Relaxed);
    let failures = counters.failures.load(Ordering::Relaxed);
    let rps = recorded as f64 / duration.as_secs_f64();

    // 2. Cross-check the server's tally against what we recorded
    let tallies_url = format!("{}/api/tallies", args.url);
    let snapshot: TallySnapshot = client
        .get(&tallies_url)
        .send()
        .await
        .context("Failed to fetch tallies")?
        .json()
        .await
        .context("Failed to parse tallies")?;

    println!("\n📊 Results:");
    println!("   Time taken: {:?}", duration);
    println!("   Votes recorded: {}", recorded);
    println!("   Duplicate casts rejected: {}", already_voted);
    println!("   Failures: {}", failures);
    println!("   Votes/sec: {:.2}", rps);
    println!("   Server total votes: {}", snapshot.total_votes);

    if (snapshot.total_votes as usize) < recorded {
        anyhow::bail!(
            "server total {} is below the {} votes this run recorded",
            snapshot.total_votes,
            recorded
        );
    }

    Ok(())
}
