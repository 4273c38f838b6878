use tracing_subscriber;
use tracing::{info, error};
use clap::Parser;
use std::convert::TryFrom;
use std::thread;
use std::time::Instant;
use bounded_blocking_queue::{BoundedBlockingQueue, CountdownLatch};
use crate::plan::Plan;

mod plan;

fn produce(queue: BoundedBlockingQueue<u64>, start: CountdownLatch, plan: Plan, id: u64) {
    start.wait();
    for seq in 0..plan.produce {
        let item = plan.item(id, seq);
        info!("producer-{} producing: {}", id, item);
        queue.enqueue(item);
    }
    info!("producer-{} done", id);
}

fn consume(queue: BoundedBlockingQueue<u64>, start: CountdownLatch, plan: Plan, id: u64) -> usize {
    start.wait();
    for _ in 0..plan.consume {
        let item = queue.dequeue();
        info!("consumer-{} consuming: {}", id, item);
    }
    info!("consumer-{} done", id);
    plan.consume as usize
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Options {
    /// queue capacity
    #[clap(short = 'c', long)]
    #[clap(default_value_t = 4)]
    capacity: i64,

    /// items enqueued by each producer
    #[clap(short = 'n', long)]
    #[clap(default_value_t = 10)]
    produce: u64,

    /// items dequeued by each consumer
    #[clap(short = 'm', long)]
    #[clap(default_value_t = 9)]
    consume: u64,

    /// producer threads
    #[clap(short, long)]
    #[clap(default_value_t = 1)]
    producers: u64,

    /// consumer threads
    #[clap(short = 'C', long)]
    #[clap(default_value_t = 1)]
    consumers: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let options = Options::parse();
    let queue = BoundedBlockingQueue::<u64>::try_from(options.capacity)?;
    let plan = Plan {
        capacity: queue.capacity(),
        producers: options.producers,
        produce: options.produce,
        consumers: options.consumers,
        consume: options.consume,
    };
    let left = plan.check()?;
    info!("{:?} initial size {}, expecting {} left over", queue, queue.size(), left);

    let start = CountdownLatch::new(1);
    let mut producers = Vec::new();
    for id in 0..plan.producers {
        let (queue, start) = (queue.clone(), start.clone());
        producers.push(thread::spawn(move || produce(queue, start, plan, id)));
    }
    let mut consumers = Vec::new();
    for id in 0..plan.consumers {
        let (queue, start) = (queue.clone(), start.clone());
        consumers.push(thread::spawn(move || consume(queue, start, plan, id)));
    }

    let begin = Instant::now();
    start.count_down();

    for producer in producers {
        if producer.join().is_err() {
            error!("producer thread panicked");
        }
    }
    let mut total = 0;
    for consumer in consumers {
        match consumer.join() {
            Ok(consumed) => total += consumed,
            Err(_) => error!("consumer thread panicked"),
        }
    }

    info!("consumed {} items in {:?}", total, begin.elapsed());
    info!("final size {}", queue.size());
    Ok(())
}
