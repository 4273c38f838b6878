use bounded_blocking_queue::Error;

/// Thread and item counts for one producer/consumer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub capacity: usize,
    pub producers: u64,
    pub produce: u64,
    pub consumers: u64,
    pub consume: u64,
}

impl Plan {
    /// Rejects runs that can only end in a deadlock. Consumers must not want
    /// more items than producers make, and the surplus left behind must fit
    /// in the queue or the producers never return.
    ///
    /// On success returns the number of items left in the queue at the end.
    pub fn check(&self) -> Result<u64, Error> {
        let produced = self.producers.checked_mul(self.produce).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{} producers x {} items overflows",
                self.producers, self.produce
            ))
        })?;
        let wanted = self.consumers.checked_mul(self.consume).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{} consumers x {} items overflows",
                self.consumers, self.consume
            ))
        })?;
        if wanted > produced {
            return Err(Error::InvalidArgument(format!(
                "consumers want {} items but producers only make {}",
                wanted, produced
            )));
        }
        let left = produced - wanted;
        if left > self.capacity as u64 {
            return Err(Error::InvalidArgument(format!(
                "{} items left over do not fit in capacity {}",
                left, self.capacity
            )));
        }
        Ok(left)
    }

    /// Tag for the `seq`-th item of producer `id`. Unique across the run and
    /// bounded by the total checked in `check`.
    pub fn item(&self, id: u64, seq: u64) -> u64 {
        id * self.produce + seq
    }
}
