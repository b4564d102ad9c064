
mod find_node;
mod refresh;
mod tree;
