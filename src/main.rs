use std::env;
use std::error::Error;
use std::time::Instant;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rbtree::{Key, RedBlackTree};

const DEFAULT_COUNT: usize = 1000;
const DEFAULT_SEED: u64 = 42;

fn print_levels(tree: &RedBlackTree) {
    if tree.is_empty() {
        println!("tree is empty");
        return;
    }
    for level in tree.breadth_first() {
        let nodes: Vec<String> = level.iter().map(|d| d.to_string()).collect();
        println!("{}", nodes.join("  "));
    }
}

fn insert_all(tree: &mut RedBlackTree, keys: &[Key]) {
    for &k in keys {
        if let Err(e) = tree.insert(k) {
            warn!("{}", e);
        }
    }
}

fn scripted(tree_keys: &[Key], delete: Option<Key>) {
    let mut tree = RedBlackTree::new();
    insert_all(&mut tree, tree_keys);
    if let Some(k) = delete {
        if let Err(e) = tree.delete(k) {
            warn!("{}", e);
        }
        println!("after deleting {}:", k);
    }
    println!("height: {}", tree.height());
    println!("in order: {:?}", tree.in_order());
    print_levels(&tree);
}

fn random_workload(count: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = RedBlackTree::new();
    let start = Instant::now();
    let mut keys = Vec::with_capacity(count);
    while tree.len() < count {
        let key: Key = rng.gen();
        if tree.insert(key).is_ok() {
            keys.push(key);
        }
    }
    info!(
        "inserted {} keys in {:?}, height {}",
        tree.len(),
        start.elapsed(),
        tree.height()
    );

    keys.shuffle(&mut rng);
    let start = Instant::now();
    for k in keys {
        tree.delete(k)?;
    }
    info!(
        "deleted every key in {:?}, height {}",
        start.elapsed(),
        tree.height()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let count = match args.next() {
        Some(a) => a.parse::<usize>()?,
        None => DEFAULT_COUNT,
    };
    let seed = match args.next() {
        Some(a) => a.parse::<u64>()?,
        None => DEFAULT_SEED,
    };

    scripted(&[13, 6, 4, 15, 3, 89, 1, 0, 13, 8], None);
    println!();
    scripted(&[13, 8, 17, 1, 11, 15, 25, 6, 22, 27], Some(13));
    println!();

    random_workload(count, seed)
}
