mod coarsen;
mod merge;
mod move_node;
