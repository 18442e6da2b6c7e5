mod test_primitives;
