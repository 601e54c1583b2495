use juniper::{EmptySubscription, RootNode};

use ctfhub_api::graphql::{Mutation, Query};

fn main() {
    let schema = RootNode::new(
        Query,
        Mutation,
        EmptySubscription::<ctfhub_api::graphql::Context>::new(),
    );

    let result = schema.as_sdl();

    std::fs::write("schema.gql", result).expect("Unable to write schema file");
}
