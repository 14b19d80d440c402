mod hourly_batches;
mod practice_pieces;
