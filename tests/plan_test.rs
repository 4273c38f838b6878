use bounded_blocking_queue::{BoundedBlockingQueue, Error};
use crate::plan::Plan;
use std::collections::HashSet;
use std::thread;

#[path = "../src/bin/producer-consumer/plan.rs"]
mod plan;

fn plan_of(capacity: usize, producers: u64, produce: u64, consumers: u64, consume: u64) -> Plan {
    Plan { capacity, producers, produce, consumers, consume }
}

#[test]
fn test_default_run_leaves_one() {
    assert_eq!(plan_of(4, 1, 10, 1, 9).check(), Ok(1));
    assert_eq!(plan_of(4, 2, 6, 3, 4).check(), Ok(0));
    assert_eq!(plan_of(4, 1, 8, 1, 4).check(), Ok(4));
}

#[test]
fn test_reject_starved_consumers() {
    assert!(matches!(plan_of(4, 1, 3, 1, 4).check(), Err(Error::InvalidArgument(_))));
    assert!(matches!(plan_of(4, 0, 10, 1, 1).check(), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_reject_stuck_producers() {
    assert!(matches!(plan_of(4, 1, 20, 1, 1).check(), Err(Error::InvalidArgument(_))));
    assert!(matches!(plan_of(4, 1, 9, 1, 4).check(), Err(Error::InvalidArgument(_))));
    assert!(matches!(plan_of(1, 3, 1, 0, 0).check(), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_reject_overflowing_counts() {
    assert!(matches!(plan_of(4, u64::MAX, 2, 1, 1).check(), Err(Error::InvalidArgument(_))));
    assert!(matches!(plan_of(4, 1, 1, 2, u64::MAX).check(), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_accepted_plan_runs_to_completion() {
    let plan = plan_of(3, 3, 7, 2, 9);
    let left = plan.check().unwrap();
    assert_eq!(left, 3);

    let queue = BoundedBlockingQueue::new(plan.capacity).unwrap();
    let producers: Vec<_> = (0..plan.producers)
        .map(|id| {
            let queue = queue.clone();
            thread::spawn(move || {
                for seq in 0..plan.produce {
                    queue.enqueue(plan.item(id, seq));
                }
            })
        })
        .collect();
    let consumers: Vec<_> = (0..plan.consumers)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || (0..plan.consume).map(|_| queue.dequeue()).collect::<Vec<u64>>())
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    let mut seen = HashSet::new();
    for consumer in consumers {
        for item in consumer.join().unwrap() {
            assert!(seen.insert(item));
        }
    }
    assert_eq!(queue.size() as u64, left);
    for _ in 0..left {
        assert!(seen.insert(queue.dequeue()));
    }
    assert_eq!(seen, (0..plan.producers * plan.produce).collect::<HashSet<u64>>());
}
